use anyhow::{anyhow, Result};

use backend_domain::{DetectionConfig, HealthWeights};

const MAX_DUPLICATE_WINDOW_HOURS: u64 = 24 * 366;
const MAX_WINDOW_DAYS: u64 = 3_660;

pub fn validate_detection(config: &DetectionConfig) -> Result<()> {
    if config.duplicate_window_hours == 0 {
        return Err(anyhow!("detection.duplicate_window_hours must be greater than 0"));
    }
    if config.duplicate_window_hours > MAX_DUPLICATE_WINDOW_HOURS {
        return Err(anyhow!(
            "detection.duplicate_window_hours must be at most {}",
            MAX_DUPLICATE_WINDOW_HOURS
        ));
    }
    if config.duplicate_amount_tolerance < 0.0 {
        return Err(anyhow!("detection.duplicate_amount_tolerance must not be negative"));
    }
    if config.rolling_window_days == 0 || config.leak_window_days == 0 {
        return Err(anyhow!("detection window days must be greater than 0"));
    }
    if config.rolling_window_days > MAX_WINDOW_DAYS || config.leak_window_days > MAX_WINDOW_DAYS {
        return Err(anyhow!("detection window days must be at most {}", MAX_WINDOW_DAYS));
    }
    if config.spike_stddev_k < 0.0 || config.spike_floor_multiplier < 1.0 {
        return Err(anyhow!(
            "detection.spike_stddev_k must be >= 0 and spike_floor_multiplier >= 1"
        ));
    }
    if config.spike_high_multiplier < config.spike_floor_multiplier {
        return Err(anyhow!(
            "detection.spike_high_multiplier must be >= spike_floor_multiplier"
        ));
    }
    if config.budget_high_overrun_ratio < 0.0 {
        return Err(anyhow!("detection.budget_high_overrun_ratio must not be negative"));
    }
    validate_percentage("category_overuse_percentage", config.category_overuse_percentage)?;
    validate_percentage(
        "category_overuse_high_percentage",
        config.category_overuse_high_percentage,
    )?;
    if config.category_overuse_high_percentage < config.category_overuse_percentage {
        return Err(anyhow!(
            "detection.category_overuse_high_percentage must be >= category_overuse_percentage"
        ));
    }
    if config.odd_hours_start > 23 || config.odd_hours_end > 24 {
        return Err(anyhow!("detection.odd_hours_start or odd_hours_end out of range"));
    }
    if config.odd_hours_utc_offset_minutes.abs() > 14 * 60 {
        return Err(anyhow!("detection.odd_hours_utc_offset_minutes out of range"));
    }
    if config.leak_min_count == 0 || config.leak_small_amount_max <= 0.0 {
        return Err(anyhow!(
            "detection.leak_min_count and leak_small_amount_max must be greater than 0"
        ));
    }
    for (name, value) in [
        ("ai_confidence_floor", config.ai_confidence_floor),
        ("ai_medium_confidence", config.ai_medium_confidence),
        ("ai_high_confidence", config.ai_high_confidence),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(anyhow!("detection.{} must be within 0..=1", name));
        }
    }
    if config.ai_confidence_floor > config.ai_medium_confidence
        || config.ai_medium_confidence > config.ai_high_confidence
    {
        return Err(anyhow!(
            "detection ai confidences must satisfy floor <= medium <= high"
        ));
    }
    Ok(())
}

pub fn validate_health(weights: &HealthWeights) -> Result<()> {
    if weights.penalty_high < weights.penalty_medium || weights.penalty_medium < weights.penalty_low {
        return Err(anyhow!("health penalties must satisfy high >= medium >= low"));
    }
    if weights.penalty_high > 100 {
        return Err(anyhow!("health.penalty_high must be at most 100"));
    }
    Ok(())
}

fn validate_percentage(name: &str, value: f64) -> Result<()> {
    if !(0.0..=100.0).contains(&value) {
        return Err(anyhow!("detection.{} must be within 0..=100", name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        validate_detection(&DetectionConfig::default()).expect("default detection");
        validate_health(&HealthWeights::default()).expect("default health");
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let config = DetectionConfig {
            ai_medium_confidence: 0.95,
            ..DetectionConfig::default()
        };
        assert!(validate_detection(&config).is_err());

        let weights = HealthWeights {
            penalty_low: 50,
            ..HealthWeights::default()
        };
        assert!(validate_health(&weights).is_err());
    }

    #[test]
    fn oversized_windows_are_rejected() {
        let config = DetectionConfig {
            duplicate_window_hours: u64::MAX,
            ..DetectionConfig::default()
        };
        assert!(validate_detection(&config).is_err());

        let config = DetectionConfig {
            leak_window_days: 100_000,
            ..DetectionConfig::default()
        };
        assert!(validate_detection(&config).is_err());
    }
}
