//! Trench registry for the tsunami early indicator.
//!
//! Defines the fixed set of simplified subduction-trench axes used as
//! proximity references by the classifier. This is the single source of
//! truth for trench geometry; other modules should reference trenches from
//! here rather than hardcoding coordinates.

// ---------------------------------------------------------------------------
// Trench metadata
// ---------------------------------------------------------------------------

/// A simplified subduction-zone reference line.
#[derive(Debug, PartialEq)]
pub struct Trench {
    /// Common name of the trench.
    pub name: &'static str,
    /// Ordered `(lat, lon)` vertices approximating the trench axis.
    pub vertices: &'static [(f64, f64)],
}

/// All trenches considered for tsunami proximity, east coast first.
///
/// The vertex lists are coarse approximations of the trench axes, good
/// enough for a ~100 km proximity test and nothing finer.
pub static TRENCH_REGISTRY: &[Trench] = &[
    Trench {
        name: "Philippine Trench",
        vertices: &[(9.0, 125.0), (10.5, 126.5), (12.0, 128.0), (13.5, 129.5), (15.0, 131.0)],
    },
    Trench {
        name: "East Luzon Trench",
        vertices: &[(18.5, 122.0), (17.0, 123.5), (15.5, 125.0), (14.0, 126.5), (12.5, 128.0)],
    },
    Trench {
        name: "Sulu Trench",
        vertices: &[(6.0, 119.0), (7.0, 118.0), (8.0, 117.0), (9.0, 116.5)],
    },
    Trench {
        name: "Negros Trench",
        vertices: &[(10.0, 123.0), (10.5, 122.0), (11.0, 121.0)],
    },
];

/// Returns the full registry.
pub fn all_trenches() -> &'static [Trench] {
    TRENCH_REGISTRY
}

/// Returns the names of all registered trenches, in registry order.
pub fn trench_names() -> Vec<&'static str> {
    TRENCH_REGISTRY.iter().map(|t| t.name).collect()
}

/// Looks up a trench by name (case-insensitive). Returns `None` if not found.
pub fn find_trench(name: &str) -> Option<&'static Trench> {
    TRENCH_REGISTRY
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_four_trenches() {
        assert_eq!(TRENCH_REGISTRY.len(), 4);
    }

    #[test]
    fn test_registry_contains_all_expected_trenches() {
        let expected = [
            "Philippine Trench",
            "East Luzon Trench",
            "Sulu Trench",
            "Negros Trench",
        ];
        let names = trench_names();
        for name in &expected {
            assert!(names.contains(name), "TRENCH_REGISTRY missing '{}'", name);
        }
    }

    #[test]
    fn test_no_duplicate_trench_names() {
        let mut seen = std::collections::HashSet::new();
        for trench in TRENCH_REGISTRY {
            assert!(
                seen.insert(trench.name),
                "duplicate trench name '{}' found in TRENCH_REGISTRY",
                trench.name
            );
        }
    }

    #[test]
    fn test_every_trench_is_a_polyline() {
        // A trench with fewer than two vertices would be silently
        // unreachable by the proximity test.
        for trench in TRENCH_REGISTRY {
            assert!(
                trench.vertices.len() >= 2,
                "trench '{}' needs at least two vertices",
                trench.name
            );
        }
    }

    #[test]
    fn test_vertices_lie_in_philippine_region() {
        for trench in TRENCH_REGISTRY {
            for &(lat, lon) in trench.vertices {
                assert!(
                    (0.0..=25.0).contains(&lat) && (110.0..=135.0).contains(&lon),
                    "vertex ({}, {}) of '{}' is outside the Philippine region",
                    lat,
                    lon,
                    trench.name
                );
            }
        }
    }

    #[test]
    fn test_find_trench_is_case_insensitive() {
        let trench = find_trench("sulu trench").expect("Sulu Trench should be in registry");
        assert_eq!(trench.name, "Sulu Trench");
        assert_eq!(trench.vertices.first(), Some(&(6.0, 119.0)));
    }

    #[test]
    fn test_find_trench_returns_none_for_unknown_name() {
        assert!(find_trench("Mariana Trench").is_none());
    }

    #[test]
    fn test_all_trenches_is_the_registry() {
        assert_eq!(all_trenches().len(), TRENCH_REGISTRY.len());
    }
}
