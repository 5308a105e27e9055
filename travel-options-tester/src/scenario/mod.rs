pub mod catalog;

use crate::logic::TravelPlan;

#[derive(Debug, Clone)]
pub struct TravelScenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub plan: TravelPlan,
}

pub fn get_scenario(name: &str) -> Option<TravelScenario> {
    let key = name.trim().to_lowercase();
    catalog::catalog_scenarios()
        .into_iter()
        .find(|scenario| scenario.key == key)
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    catalog::catalog_scenarios()
        .into_iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

pub fn all_scenario_keys() -> Vec<&'static str> {
    catalog::catalog_scenarios()
        .into_iter()
        .map(|scenario| scenario.key)
        .collect()
}
