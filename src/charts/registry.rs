use super::{Chart, ChartConfig};
use anyhow::{anyhow, Result};

/// Builds a chart from its config entry
pub type ChartFactory = fn(&ChartConfig) -> Box<dyn Chart>;

/// Registration record submitted by every chart module
pub struct ChartRegistration {
    pub kind: &'static str,
    pub factory: ChartFactory,
}

inventory::collect!(ChartRegistration);

pub fn create_chart(config: &ChartConfig) -> Result<Box<dyn Chart>> {
    inventory::iter::<ChartRegistration>
        .into_iter()
        .find(|registration| registration.kind == config.kind)
        .map(|registration| (registration.factory)(config))
        .ok_or_else(|| anyhow!("Unknown chart kind: {}", config.kind))
}

pub fn registered_kinds() -> Vec<&'static str> {
    let mut kinds: Vec<&'static str> = inventory::iter::<ChartRegistration>
        .into_iter()
        .map(|registration| registration.kind)
        .collect();
    kinds.sort_unstable();
    kinds
}
