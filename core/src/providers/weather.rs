/// Weather Provider
///
/// Fetches current conditions and a 7-day forecast from the Open-Meteo API
/// (free, no API key required); locations are geocoded by name first.
use crate::{AgriMindError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the Open-Meteo weather provider
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    /// Forecast API endpoint
    pub forecast_endpoint: String,
    /// Geocoding API endpoint
    pub geocoding_endpoint: String,
    /// Timeout for API requests in milliseconds
    pub timeout_ms: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            forecast_endpoint: "https://api.open-meteo.com/v1/forecast".to_string(),
            geocoding_endpoint: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            timeout_ms: 10_000,
            user_agent: "agrimind/0.1".to_string(),
        }
    }
}

/// Current conditions at a location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeather {
    /// Degrees Celsius, rounded
    pub temperature: i32,
    /// Relative humidity percent
    pub humidity: i32,
    /// Rain in the current hour, mm
    pub rainfall: f64,
    /// Wind speed in km/h
    pub wind_speed: i32,
    pub condition: String,
}

/// One day of the daily forecast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastDay {
    /// Weekday abbreviation, e.g. "Mon"
    pub day: String,
    /// Daily maximum, degrees Celsius rounded
    pub temp: i32,
    /// Precipitation sum, mm to one decimal
    pub rain: f64,
    pub condition: String,
}

/// Current conditions plus the week ahead
#[derive(Debug, Clone)]
pub struct WeatherBulletin {
    pub current: CurrentWeather,
    pub forecast: Vec<ForecastDay>,
}

/// Live weather collaborator
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<WeatherBulletin>;
}

/// Geocoding response from Open-Meteo
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeoLocation>>,
}

#[derive(Debug, Deserialize)]
struct GeoLocation {
    latitude: f64,
    longitude: f64,
}

/// Forecast response from Open-Meteo
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentBlock,
    daily: DailyBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature_2m: f64,
    relativehumidity_2m: i32,
    rain: f64,
    windspeed_10m: f64,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<String>,
    weathercode: Vec<i32>,
    temperature_2m_max: Vec<f64>,
    precipitation_sum: Vec<f64>,
}

/// Open-Meteo weather provider
pub struct OpenMeteoWeather {
    config: WeatherConfig,
    http_client: reqwest::Client,
}

impl OpenMeteoWeather {
    pub fn new() -> Self {
        Self::with_config(WeatherConfig::default())
    }

    pub fn with_config(config: WeatherConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(&config.user_agent)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            config,
            http_client,
        }
    }

    /// Geocode location name to coordinates
    async fn geocode(&self, location: &str) -> Result<(f64, f64)> {
        // Geocoding works best on the primary place name ("Bhopal", not
        // "Bhopal, Madhya Pradesh")
        let simple = location.split(',').next().unwrap_or(location).trim();
        debug!(target: "weather", location = %simple, "Geocoding location");

        let url = format!(
            "{}?name={}&count=1&language=en&format=json",
            self.config.geocoding_endpoint,
            urlencoding::encode(simple)
        );

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            warn!(target: "weather", error = %e, "Geocoding API request failed");
            AgriMindError::ProviderError(format!("Geocoding request failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(target: "weather", status = %status, "Geocoding API returned error");
            return Err(AgriMindError::ProviderError(format!(
                "Geocoding API returned status: {}",
                status
            )));
        }

        let geo: GeocodingResponse = response.json().await.map_err(|e| {
            AgriMindError::ProviderError(format!("Failed to parse geocoding response: {}", e))
        })?;

        let hit = geo
            .results
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| {
                AgriMindError::ProviderError(format!("Location not found: {}", location))
            })?;

        Ok((hit.latitude, hit.longitude))
    }

    async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<ForecastResponse> {
        debug!(target: "weather", %lat, %lon, "Fetching forecast data");

        let url = format!(
            "{}?latitude={}&longitude={}&daily=weathercode,temperature_2m_max,precipitation_sum&current=temperature_2m,relativehumidity_2m,rain,windspeed_10m&timezone=auto",
            self.config.forecast_endpoint, lat, lon
        );

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            warn!(target: "weather", error = %e, "Weather API request failed");
            AgriMindError::ProviderError(format!("Weather API request failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(target: "weather", status = %status, "Weather API returned error");
            return Err(AgriMindError::ProviderError(format!(
                "Weather API returned status: {}",
                status
            )));
        }

        response.json().await.map_err(|e| {
            AgriMindError::ProviderError(format!("Failed to parse weather response: {}", e))
        })
    }
}

impl Default for OpenMeteoWeather {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoWeather {
    async fn fetch(&self, location: &str) -> Result<WeatherBulletin> {
        let (lat, lon) = self.geocode(location).await?;
        let data = self.fetch_forecast(lat, lon).await?;

        let current = CurrentWeather {
            temperature: data.current.temperature_2m.round() as i32,
            humidity: data.current.relativehumidity_2m,
            rainfall: data.current.rain,
            wind_speed: data.current.windspeed_10m as i32,
            condition: weathercode_to_condition(*data.daily.weathercode.first().unwrap_or(&0)),
        };

        let mut forecast = Vec::new();
        let days = data
            .daily
            .time
            .iter()
            .zip(data.daily.weathercode.iter())
            .zip(data.daily.temperature_2m_max.iter())
            .zip(data.daily.precipitation_sum.iter())
            .take(7);
        for (((date, code), temp), rain) in days {
            let day = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map(|d| d.format("%a").to_string())
                .map_err(|e| {
                    AgriMindError::ProviderError(format!("Bad forecast date {date}: {e}"))
                })?;
            forecast.push(ForecastDay {
                day,
                temp: temp.round() as i32,
                rain: (rain * 10.0).round() / 10.0,
                condition: weathercode_to_condition(*code),
            });
        }

        Ok(WeatherBulletin { current, forecast })
    }
}

/// Convert WMO weather codes from Open-Meteo into simple condition strings
pub fn weathercode_to_condition(code: i32) -> String {
    match code {
        0 | 1 => "Clear",
        2 | 3 => "Clouds",
        45 | 48 => "Fog",
        51 | 53 | 55 | 56 | 57 | 61 | 63 | 65 | 66 | 67 | 80..=82 => "Rain",
        71 | 73 | 75 | 77 | 85 | 86 => "Snow",
        95 | 96 | 99 => "Thunderstorm",
        _ => "Clear",
    }
    .to_string()
}

// Module for URL encoding
mod urlencoding {
    pub fn encode(s: &str) -> String {
        s.chars()
            .map(|c| match c {
                'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '~' => c.to_string(),
                ' ' => "+".to_string(),
                _ => {
                    let mut buf = [0; 4];
                    let bytes = c.encode_utf8(&mut buf).as_bytes();
                    bytes.iter().map(|b| format!("%{:02X}", b)).collect()
                }
            })
            .collect()
    }
}
