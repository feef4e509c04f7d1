//! Built-in equalizer modes.
//!
//! Embedded as TOML so they parse through the same path as user files. Every
//! slider starts at unity gain with a 0 to 2 range.

use crate::Mode;

/// Names of the built-in modes.
pub static FACTORY_MODE_NAMES: &[&str] = &["generic", "musical", "animal", "human"];

static FACTORY_MODES_TOML: &[(&str, &str)] = &[
    ("generic", GENERIC_MODE),
    ("musical", MUSICAL_MODE),
    ("animal", ANIMAL_MODE),
    ("human", HUMAN_MODE),
];

/// No sliders; bands are supplied by the caller.
const GENERIC_MODE: &str = r#"
name = "Generic"
description = "Free-form bands supplied by the user"
"#;

const MUSICAL_MODE: &str = r#"
name = "Musical"
description = "Instrument ranges"

[[bands]]
label = "Guitar"
ranges = [[82.0, 1175.0]]

[[bands]]
label = "Piano"
ranges = [[27.0, 4186.0]]

[[bands]]
label = "Drums"
ranges = [[50.0, 200.0], [2000.0, 5000.0]]

[[bands]]
label = "Violin"
ranges = [[196.0, 3136.0]]
"#;

const ANIMAL_MODE: &str = r#"
name = "Animal"
description = "Animal vocalization ranges"

[[bands]]
label = "Dog"
ranges = [[500.0, 1000.0]]

[[bands]]
label = "Cat"
ranges = [[700.0, 1500.0]]

[[bands]]
label = "Bird"
ranges = [[2000.0, 8000.0]]

[[bands]]
label = "Cow"
ranges = [[150.0, 500.0]]
"#;

const HUMAN_MODE: &str = r#"
name = "Human"
description = "Voice fundamental ranges"

[[bands]]
label = "Male Voice"
ranges = [[85.0, 180.0]]

[[bands]]
label = "Female Voice"
ranges = [[165.0, 255.0]]

[[bands]]
label = "Old Person"
ranges = [[100.0, 200.0]]

[[bands]]
label = "Young Person"
ranges = [[200.0, 400.0]]
"#;

/// All built-in modes, in [`FACTORY_MODE_NAMES`] order.
pub fn factory_modes() -> Vec<Mode> {
    FACTORY_MODES_TOML
        .iter()
        .filter_map(|(_, toml)| Mode::from_toml(toml).ok())
        .collect()
}

/// Look up a built-in mode by key or display name, case-insensitively.
///
/// # Example
///
/// ```rust
/// use equalis_config::get_factory_mode;
///
/// let mode = get_factory_mode("musical").unwrap();
/// assert_eq!(mode.bands[2].label, "Drums");
/// ```
pub fn get_factory_mode(name: &str) -> Option<Mode> {
    let name_lower = name.to_lowercase();
    FACTORY_MODES_TOML
        .iter()
        .filter_map(|(key, toml)| Some((key, Mode::from_toml(toml).ok()?)))
        .find(|(key, mode)| **key == name_lower || mode.name.to_lowercase() == name_lower)
        .map(|(_, mode)| mode)
}

/// True if `name` is a built-in mode key.
pub fn is_factory_mode(name: &str) -> bool {
    let name_lower = name.to_lowercase();
    FACTORY_MODE_NAMES.iter().any(|n| *n == name_lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_modes_parse() {
        let modes = factory_modes();
        assert_eq!(modes.len(), FACTORY_MODE_NAMES.len());
    }

    #[test]
    fn lookup_by_key_and_name() {
        assert_eq!(get_factory_mode("HUMAN").unwrap().name, "Human");
        assert_eq!(get_factory_mode("Animal").unwrap().len(), 4);
        assert!(get_factory_mode("opera").is_none());
    }

    #[test]
    fn generic_has_no_bands() {
        let mode = get_factory_mode("generic").unwrap();
        assert!(mode.is_empty());
        assert!(mode.with_gains(&[]).unwrap().is_empty());
    }

    #[test]
    fn sliders_start_at_unity() {
        for mode in factory_modes() {
            for band in &mode.bands {
                assert_eq!(band.gain, 1.0, "{} / {}", mode.name, band.label);
                assert_eq!((band.min_gain, band.max_gain), (0.0, 2.0));
            }
        }
    }

    #[test]
    fn drums_have_two_ranges() {
        let mode = get_factory_mode("musical").unwrap();
        assert_eq!(mode.bands[2].ranges, vec![[50.0, 200.0], [2000.0, 5000.0]]);
    }

    #[test]
    fn is_factory_mode_checks_keys() {
        assert!(is_factory_mode("Musical"));
        assert!(!is_factory_mode("custom"));
    }
}
