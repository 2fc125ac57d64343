// Adapters layer: concrete rendering targets and navigators behind the domain ports.

pub mod headless;
