use std::collections::{BTreeMap, BTreeSet};

use serde::{Serialize, Serializer};

/// An RGB colour, written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Colour { r, g, b }
    }

    /// `h` in degrees, `s` and `v` in `[0, 1]`.
    pub fn from_hsv(h: f64, s: f64, v: f64) -> Self {
        let h = h.rem_euclid(360.0) / 60.0;
        let c = v * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = v - c;
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let to_u8 = |f: f64| ((f + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Colour::rgb(to_u8(r), to_u8(g), to_u8(b))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Colour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Colour {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Colour of contigs without a bin, in every output.
pub const UNBINNED_COLOUR: Colour = Colour::rgb(0xd3, 0xd3, 0xd3);

/// Colour of contigs whose bin label has no palette entry, e.g. a bin
/// that only exists in the final snapshot.
pub const UNKNOWN_BIN_COLOUR: Colour = Colour::rgb(0x6b, 0x72, 0x80);

/// High-contrast colours handed out first. White and black are left
/// out since they read as background and edges.
const DISTINCT_COLOURS: [Colour; 20] = [
    Colour::rgb(0xe6, 0x19, 0x4b),
    Colour::rgb(0x3c, 0xb4, 0x4b),
    Colour::rgb(0xff, 0xe1, 0x19),
    Colour::rgb(0x43, 0x63, 0xd8),
    Colour::rgb(0xf5, 0x82, 0x31),
    Colour::rgb(0x91, 0x1e, 0xb4),
    Colour::rgb(0x46, 0xf0, 0xf0),
    Colour::rgb(0xf0, 0x32, 0xe6),
    Colour::rgb(0xbc, 0xf6, 0x0c),
    Colour::rgb(0xfa, 0xbe, 0xbe),
    Colour::rgb(0x00, 0x80, 0x80),
    Colour::rgb(0xe6, 0xbe, 0xff),
    Colour::rgb(0x9a, 0x63, 0x24),
    Colour::rgb(0xff, 0xfa, 0xc8),
    Colour::rgb(0x80, 0x00, 0x00),
    Colour::rgb(0xaa, 0xff, 0xc3),
    Colour::rgb(0x80, 0x80, 0x00),
    Colour::rgb(0xff, 0xd8, 0xb1),
    Colour::rgb(0x00, 0x00, 0x75),
    Colour::rgb(0x80, 0x80, 0x80),
];

const GOLDEN_ANGLE: f64 = 137.507_764_050_037_85;

/// `n` visually distinct colours. The result depends only on `n`, and
/// the first `k` colours of `distinct_colours(n)` are the same for
/// every `n >= k`.
pub fn distinct_colours(n: usize) -> Vec<Colour> {
    (0..n)
        .map(|i| {
            if let Some(&c) = DISTINCT_COLOURS.get(i) {
                c
            } else {
                let j = i - DISTINCT_COLOURS.len();
                let hue = j as f64 * GOLDEN_ANGLE;
                let (s, v) = match j % 3 {
                    0 => (0.75, 0.90),
                    1 => (0.55, 0.75),
                    _ => (0.90, 0.60),
                };
                Colour::from_hsv(hue, s, v)
            }
        })
        .collect()
}

/// Bin label to colour. Labels are sorted before colours are drawn,
/// so the mapping doesn't depend on the order labels were read in.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Palette {
    colours: BTreeMap<String, Colour>,
}

impl Palette {
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let distinct: BTreeSet<String> =
            labels.into_iter().map(Into::into).collect();
        let colours = distinct_colours(distinct.len());
        Palette {
            colours: distinct.into_iter().zip(colours).collect(),
        }
    }

    pub fn get(&self, label: &str) -> Option<Colour> {
        self.colours.get(label).copied()
    }

    /// Colour of a node with the given bin, falling back to the
    /// unbinned and unknown-bin colours.
    pub fn colour_of(&self, label: Option<&str>) -> Colour {
        match label {
            None => UNBINNED_COLOUR,
            Some(label) => self.get(label).unwrap_or(UNKNOWN_BIN_COLOUR),
        }
    }

    pub fn len(&self) -> usize {
        self.colours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colours.is_empty()
    }

    /// Entries in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Colour)> + '_ {
        self.colours.iter().map(|(l, c)| (l.as_str(), *c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_ignores_label_order() {
        let a = Palette::from_labels(vec!["bin_2", "bin_1", "bin_2", "bin_10"]);
        let b = Palette::from_labels(vec!["bin_10", "bin_2", "bin_2", "bin_1"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);

        let labels: Vec<_> = a.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["bin_1", "bin_10", "bin_2"]);
        assert_eq!(a.get("bin_1"), Some(DISTINCT_COLOURS[0]));
        assert_eq!(a.get("bin_10"), Some(DISTINCT_COLOURS[1]));
        assert_eq!(a.get("bin_2"), Some(DISTINCT_COLOURS[2]));
    }

    #[test]
    fn colour_fallbacks() {
        let p = Palette::from_labels(vec!["a"]);
        assert_eq!(p.colour_of(None), UNBINNED_COLOUR);
        assert_eq!(p.colour_of(Some("zzz")), UNKNOWN_BIN_COLOUR);
        assert_eq!(p.colour_of(Some("a")), DISTINCT_COLOURS[0]);
    }

    #[test]
    fn many_colours_stay_distinct_and_stable() {
        let small = distinct_colours(5);
        let big = distinct_colours(60);
        assert_eq!(&big[..5], &small[..]);
        for (i, a) in big.iter().enumerate() {
            for b in big.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert_eq!(distinct_colours(60), big);
    }

    #[test]
    fn hex_colours() {
        let c = Colour::rgb(230, 25, 75);
        assert_eq!(c.to_hex(), "#e6194b");
        assert_eq!(UNBINNED_COLOUR.to_string(), "#d3d3d3");
        assert_eq!(UNKNOWN_BIN_COLOUR.to_hex(), "#6b7280");

        let red = Colour::from_hsv(0.0, 1.0, 1.0);
        assert_eq!(red, Colour::rgb(255, 0, 0));
        let blue = Colour::from_hsv(240.0, 1.0, 1.0);
        assert_eq!(blue, Colour::rgb(0, 0, 255));
    }

    #[test]
    fn palette_serializes_as_hex_map() {
        let p = Palette::from_labels(vec!["b", "a"]);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r##"{"a":"#e6194b","b":"#3cb44b"}"##);
    }
}
