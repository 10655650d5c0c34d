//! Weather lookup tool — stub that returns mock weather data.
//!
//! In production this would call a real weather API. The stub derives
//! plausible weather from a hash of the location name, so results are
//! deterministic and the loop can be tested end-to-end without network
//! access. Emits both a raw tool result and a `WeatherCard` component so
//! the component prop-validation path is exercised.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use skein_core::content::ContentItem;
use skein_core::error::ToolError;
use skein_core::tool::Tool;

pub struct WeatherLookupTool;

#[async_trait]
impl Tool for WeatherLookupTool {
    fn name(&self) -> &str {
        "weather_lookup"
    }

    fn description(&self) -> &str {
        "Look up current weather conditions for a location. Returns temperature, conditions, humidity, and wind speed."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The city name or location to look up weather for"
                },
                "units": {
                    "type": "string",
                    "enum": ["metric", "imperial"],
                    "description": "Temperature units (default: metric)",
                    "default": "metric"
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        cancel: CancellationToken,
    ) -> Result<Vec<ContentItem>, ToolError> {
        if cancel.is_cancelled() {
            return Err(ToolError::Cancelled("weather_lookup".into()));
        }

        let location = params["location"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'location' argument".into()))?;
        let units = params["units"].as_str().unwrap_or("metric");

        let weather = generate_mock_weather(location, units);
        let data = serde_json::to_value(&weather)
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "weather_lookup".into(),
                reason: e.to_string(),
            })?;

        Ok(vec![
            ContentItem::ToolResult { data: data.clone() },
            ContentItem::Component {
                name: "WeatherCard".into(),
                props: serde_json::json!({
                    "location": weather.location,
                    "temperature": weather.temperature,
                    "units": weather.units,
                    "conditions": weather.conditions,
                }),
            },
        ])
    }
}

#[derive(serde::Serialize)]
struct WeatherData {
    location: String,
    temperature: f64,
    units: String,
    conditions: String,
    humidity: u32,
    wind_speed: f64,
}

/// Generate deterministic mock weather based on location name hash.
fn generate_mock_weather(location: &str, units: &str) -> WeatherData {
    let hash: u32 = location
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));

    let conditions_list = [
        "Clear skies",
        "Partly cloudy",
        "Overcast",
        "Light rain",
        "Heavy rain",
        "Thunderstorms",
        "Snow",
        "Foggy",
    ];

    let base_temp_c = ((hash % 40) as f64) - 5.0; // -5 to 35°C
    let (temperature, unit_label) = if units == "imperial" {
        (base_temp_c * 9.0 / 5.0 + 32.0, "°F")
    } else {
        (base_temp_c, "°C")
    };

    WeatherData {
        location: location.to_string(),
        temperature: (temperature * 10.0).round() / 10.0,
        units: unit_label.to_string(),
        conditions: conditions_list[(hash as usize / 7) % conditions_list.len()].to_string(),
        humidity: 30 + (hash % 60),
        wind_speed: ((hash % 30) as f64) + 5.0,
    }
}
