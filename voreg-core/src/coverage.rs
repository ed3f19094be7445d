//! Parsing of embedded geometry expressions into the profile sub-structure.
//!
//! Coverage metadata arrives as a compact textual expression (`AllSky`,
//! `Circle ICRS 12.0 45.0 0.5`, `Polygon ICRS ra1 dec1 ra2 dec2 ...`).
//! A bad expression never aborts a lenient build; the caller logs it and
//! omits the sub-structure.

use crate::error::BuildError;
use crate::model::stc;
use crate::xml::Node;

fn bad(expr: &str, reason: impl Into<String>) -> BuildError {
    BuildError::BadCoverage {
        expr: expr.to_string(),
        reason: reason.into(),
    }
}

fn parse_floats(expr: &str, tokens: &[&str]) -> Result<Vec<f64>, BuildError> {
    tokens
        .iter()
        .map(|t| {
            t.parse::<f64>()
                .map_err(|_| bad(expr, format!("'{t}' is not a number")))
        })
        .collect()
}

/// Parse a geometry expression into a profile node for literal embedding.
pub fn profile_node(expr: &str) -> Result<Node, BuildError> {
    let mut tokens = expr.split_whitespace();
    let shape = tokens.next().ok_or_else(|| bad(expr, "empty expression"))?;
    let rest: Vec<&str> = tokens.collect();

    let region = match shape {
        "AllSky" => {
            if !rest.is_empty() {
                return Err(bad(expr, "AllSky takes no arguments"));
            }
            stc::all_sky()
        }
        "Circle" => {
            let (frame, nums) = split_frame(expr, &rest)?;
            let nums = parse_floats(expr, nums)?;
            if nums.len() != 3 {
                return Err(bad(expr, "Circle needs a center and a radius"));
            }
            stc::circle()
                .attr("frame", frame)
                .with(stc::center().with_text(format!("{} {}", nums[0], nums[1])))
                .with(stc::radius().with_text(nums[2].to_string()))
        }
        "Polygon" => {
            let (frame, nums) = split_frame(expr, &rest)?;
            let nums = parse_floats(expr, nums)?;
            if nums.len() < 6 || nums.len() % 2 != 0 {
                return Err(bad(expr, "Polygon needs at least three coordinate pairs"));
            }
            let mut poly = stc::polygon().attr("frame", frame);
            for pair in nums.chunks(2) {
                poly.push(
                    stc::vertex()
                        .with(stc::position().with_text(format!("{} {}", pair[0], pair[1]))),
                );
            }
            poly
        }
        other => return Err(bad(expr, format!("unknown shape '{other}'"))),
    };

    Ok(stc::resource_profile().with(region))
}

fn split_frame<'a>(expr: &str, rest: &'a [&'a str]) -> Result<(&'a str, &'a [&'a str]), BuildError> {
    match rest.split_first() {
        Some((&frame, nums)) if frame.chars().all(|c| c.is_ascii_alphabetic()) && !frame.is_empty() => {
            Ok((frame, nums))
        }
        _ => Err(bad(expr, "missing reference frame")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_parses_into_a_profile() {
        let node = profile_node("Circle ICRS 12.5 -30.0 0.25").unwrap();
        assert_eq!(node.name(), "STCResourceProfile");
        let circle = &node.children()[0];
        assert_eq!(circle.name(), "Circle");
        assert_eq!(circle.attr_value("frame").unwrap(), "ICRS");
        assert_eq!(circle.children().len(), 2);
    }

    #[test]
    fn polygon_collects_vertices() {
        let node = profile_node("Polygon ICRS 0 0 10 0 10 10 0 10").unwrap();
        let poly = &node.children()[0];
        assert_eq!(poly.children().len(), 4);
    }

    #[test]
    fn all_sky_is_bare() {
        let node = profile_node("AllSky").unwrap();
        assert_eq!(node.children()[0].name(), "AllSky");
    }

    #[test]
    fn garbage_is_rejected_with_the_expression() {
        for expr in [
            "",
            "Circle ICRS 12.5",
            "Circle 12.5 30 1",
            "Polygon ICRS 0 0 10 0",
            "Banana ICRS 1 2 3",
            "Circle ICRS a b c",
        ] {
            let err = profile_node(expr).unwrap_err();
            assert!(matches!(err, BuildError::BadCoverage { .. }), "{expr}");
        }
    }
}
