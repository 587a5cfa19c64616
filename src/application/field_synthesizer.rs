//! Enrichment fields the catalog does not carry
//!
//! Material is read from the product name when a keyword matches; everything
//! else (and material without a match) is picked uniformly from fixed sets.
//! These values are fabricated to complete the target schema. Tests may only
//! assert membership in the allowed sets.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::domain::{Gender, Material};

pub const GOLD_KARATS: [u8; 4] = [10, 14, 18, 24];

pub const BRANDS: [&str; 9] = [
    "PNJ",
    "PNJSilver",
    "Style by PNJ",
    "CAO Fine Jewellery",
    "Disney|PNJ",
    "Sanrio|PNJ",
    "PNJ Next",
    "Tiffany & Co.",
    "Swarovski",
];

const GOLD_COLORS: &[&str] = &["Yellow", "White", "Rose"];
const SILVER_COLORS: &[&str] = &["Silver"];
const DIAMOND_COLORS: &[&str] = &["Clear", "White", "Yellow", "Pink", "Blue"];
const PLATINUM_COLORS: &[&str] = &["White", "Silver"];
const PEARL_COLORS: &[&str] = &["White", "Cream", "Pink", "Black"];
const DEFAULT_COLORS: &[&str] = &["Mixed", "Gold", "Silver", "Various"];

/// Keyword table in match order. Platinum comes first: "bạch" contains "bạc".
const MATERIAL_KEYWORDS: [(Material, &[&str]); 6] = [
    (Material::Platinum, &["bạch kim", "platinum"]),
    (Material::Gold, &["vàng", "gold"]),
    (Material::Silver, &["bạc", "silver"]),
    (Material::Diamond, &["kim cương", "diamond"]),
    (Material::Pearl, &["ngọc trai", "pearl"]),
    (Material::Gemstone, &["đá quý", "gemstone"]),
];

static MATERIAL_PATTERNS: Lazy<Vec<(Material, Regex)>> = Lazy::new(|| {
    MATERIAL_KEYWORDS
        .iter()
        .filter_map(|(material, words)| {
            let pattern = words.iter().map(|w| regex::escape(w)).collect::<Vec<_>>().join("|");
            RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .ok()
                .map(|re| (*material, re))
        })
        .collect()
});

/// Candidate colors for a material
pub fn color_candidates(material: Material) -> &'static [&'static str] {
    match material {
        Material::Gold => GOLD_COLORS,
        Material::Silver => SILVER_COLORS,
        Material::Diamond => DIAMOND_COLORS,
        Material::Platinum => PLATINUM_COLORS,
        Material::Pearl => PEARL_COLORS,
        Material::Gemstone | Material::Alloy => DEFAULT_COLORS,
    }
}

/// Keyword match only; `None` when no keyword appears in the name
pub fn material_from_name(name: &str) -> Option<Material> {
    MATERIAL_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(name))
        .map(|(material, _)| *material)
}

/// Uniform index source; the only randomness in the pipeline
pub trait EnrichmentSource {
    /// Index in `0..len`; `len` is never zero
    fn pick_index(&mut self, len: usize) -> usize;
}

impl EnrichmentSource for fastrand::Rng {
    fn pick_index(&mut self, len: usize) -> usize {
        if len == 0 { 0 } else { self.usize(..len) }
    }
}

pub struct FieldSynthesizer<R = fastrand::Rng> {
    source: R,
}

impl FieldSynthesizer<fastrand::Rng> {
    /// Seeded when `seed` is set, otherwise seeded from entropy
    pub fn new(seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        Self { source: rng }
    }
}

impl<R: EnrichmentSource> FieldSynthesizer<R> {
    pub fn with_source(source: R) -> Self {
        Self { source }
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[self.source.pick_index(items.len())]
    }

    pub fn material(&mut self, name: &str) -> Material {
        match material_from_name(name) {
            Some(material) => material,
            None => self.pick(&Material::ALL),
        }
    }

    pub fn gold_karat(&mut self, material: Material) -> Option<u8> {
        (material == Material::Gold).then(|| self.pick(&GOLD_KARATS))
    }

    pub fn color(&mut self, material: Material) -> &'static str {
        self.pick(color_candidates(material))
    }

    pub fn brand(&mut self) -> &'static str {
        self.pick(&BRANDS)
    }

    pub fn gender(&mut self) -> Gender {
        self.pick(&Gender::ALL)
    }
}
