//! Mock weather lookup tool.

use async_trait::async_trait;
use proto::ToolResult;
use rand::Rng;
use serde::Deserialize;
use tracing::debug;

use crate::Tool;

const CONDITIONS: &[&str] = &[
    "sunny",
    "partly cloudy",
    "overcast",
    "light rain",
    "moderate rain",
    "heavy rain",
    "snow",
];

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    location: String,
}

/// Tool that returns a randomized weather report for a location.
///
/// Readings are generated, not fetched; the tool exists to exercise the
/// confirmation flow with a call that looks like an external side effect.
pub struct WeatherTool;

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Look up the current weather for a location. \
         Returns condition, temperature, humidity, and wind speed."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "Name of the place to look up"
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, call_id: &str, args: serde_json::Value) -> ToolResult {
        let weather_args: WeatherArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => {
                return ToolResult::error(call_id, self.name(), format!("Invalid arguments: {e}"));
            }
        };

        debug!("Generating weather for {}", weather_args.location);

        let mut rng = rand::thread_rng();
        let report = serde_json::json!({
            "location": weather_args.location,
            "weather": CONDITIONS[rng.gen_range(0..CONDITIONS.len())],
            "temperature": rng.gen_range(-10..40),
            "humidity": rng.gen_range(30..100),
            "wind_speed": rng.gen_range(0..20),
            "unit": "°C",
            "humidity_unit": "%",
            "wind_unit": "km/h"
        });

        ToolResult::success(call_id, self.name(), report.to_string())
    }
}
