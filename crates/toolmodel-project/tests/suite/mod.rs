mod example_scenario;
mod properties;
