use forecast_core::{ScreenState, WeatherSnapshot};

/// Text rendition of the screen.
pub fn render(state: &ScreenState) -> String {
    let mut lines = Vec::new();

    if state.search_visible {
        lines.push("[search open]".to_string());
        for (i, candidate) in state.visible_candidates().iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, candidate.label()));
        }
    }

    for error in state.errors() {
        lines.push(format!("! {}", error.message));
    }

    if state.loading {
        lines.push("Loading forecast...".to_string());
    } else if let Some(weather) = &state.weather {
        render_weather(weather, &mut lines);
    } else {
        lines.push("No forecast available.".to_string());
    }

    lines.join("\n")
}

fn render_weather(weather: &WeatherSnapshot, lines: &mut Vec<String>) {
    let current = &weather.current;

    lines.push(format!("{}, {}", weather.location.name, weather.location.country));
    lines.push(format!("{}º  {}", current.temperature_c, current.condition));
    lines.push(format!(
        "wind {} mile  |  humidity {}%  |  sunrise {}",
        current.wind_mph,
        current.humidity_pct,
        weather.sunrise_today().unwrap_or("-"),
    ));

    if weather.days.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push("Daily Forecast".to_string());
    for day in &weather.days {
        lines.push(format!("  {:<10} {:>5}º  {}", day.weekday_name(), day.avg_temp_c, day.condition));
    }
}
