use anyhow::Result;
use companion_core::{
    CommuteAlert, DailyForecast, DailyMean, FavoriteCity, MoodEntry, WeatherReport,
};

pub fn print_report(report: &WeatherReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let s = &report.sample;
    println!("{} ({})", report.location.name, s.timestamp.format("%Y-%m-%d %H:%M"));
    println!("  Temperature:   {}", both_scales(s.temperature_c));
    if let Some(feels_like) = report.feels_like_c {
        println!("  Feels like:    {}", both_scales(feels_like));
    }
    println!("  Condition:     {}", report.condition);
    println!("  Precipitation: {:.1} mm", s.precipitation_mm);
    println!("  Wind:          {:.1} km/h", s.wind_speed_kmh);
    println!("  Outfit:        {}", report.outfit);
    println!("  Activity:      {}", report.activity);
    println!("  (via {})", report.provider);
    Ok(())
}

pub fn print_best_times(activity: &str, date: &str, times: &[String], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::json!({ "best_times": times }));
    } else if times.is_empty() {
        println!("No suitable times for {activity} on {date}.");
    } else {
        println!("Best times for {activity} on {date}: {}", times.join(", "));
    }
    Ok(())
}

pub fn print_commute(alert: &CommuteAlert, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(alert)?);
    } else {
        println!("{alert}");
    }
    Ok(())
}

pub fn print_outlook(location: &str, outlook: &[DailyForecast], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outlook)?);
        return Ok(());
    }

    println!("{location}");
    if outlook.is_empty() {
        println!("  No forecast days available.");
    }
    for d in outlook {
        println!(
            "  {}  {:>5.1} / {:>5.1}°C  {:>5.1} mm  {}",
            d.date.format("%a %Y-%m-%d"),
            d.temperature_min_c,
            d.temperature_max_c,
            d.precipitation_sum_mm,
            d.condition.describe()
        );
    }
    Ok(())
}

pub fn print_trend(location: &str, trend: &[DailyMean], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(trend)?);
        return Ok(());
    }

    println!("{location}");
    if trend.is_empty() {
        println!("  No trend data available.");
    }
    for d in trend {
        println!("  {}  {:>5.1}°C", d.date.format("%a %Y-%m-%d"), d.temperature_mean_c);
    }
    Ok(())
}

pub fn print_moods(moods: &[MoodEntry], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(moods)?);
    } else if moods.is_empty() {
        println!("No moods recorded yet.");
    } else {
        for m in moods {
            println!(
                "{}  mood {:>2}  {:>5.1}°C  {}",
                m.recorded_at.format("%Y-%m-%d %H:%M"),
                m.mood,
                m.temperature_c,
                m.condition
            );
        }
    }
    Ok(())
}

pub fn print_favorites(favorites: &[FavoriteCity], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(favorites)?);
    } else if favorites.is_empty() {
        println!("No favorites.");
    } else {
        for f in favorites {
            println!("{}", f.city);
        }
    }
    Ok(())
}

fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

fn both_scales(c: f64) -> String {
    format!("{:.1}°C ({:.1}°F)", c, celsius_to_fahrenheit(c))
}
