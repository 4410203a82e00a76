use crate::{capability::Location, trigger::TriggerSource};

pub fn compose_alert_message(
    source: TriggerSource,
    location: &Location,
    map_url_prefix: &str,
) -> String {
    match location.coordinates() {
        Some((lat, lon)) => {
            format!("EMERGENCY! Trigger: {source}. Location: {map_url_prefix}{lat},{lon}")
        }
        None => format!("EMERGENCY! Trigger: {source}. Location: unknown"),
    }
}

pub fn notification_title(source: TriggerSource) -> String {
    format!("{source} SOS Alert")
}
