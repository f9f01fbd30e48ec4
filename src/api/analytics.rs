use serde::Serialize;

/// Market overview served to the dashboard. Reference figures, not computed
/// per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub top_locations: Vec<LocationPrice>,
    pub bhk_distribution: Vec<BhkPrice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationPrice {
    pub name: &'static str,
    pub price: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BhkPrice {
    pub bhk: u32,
    pub avg_price: u64,
}

const TOP_LOCATIONS: [(&str, u64); 10] = [
    ("Ambli", 12_500_000),
    ("Bodakdev", 11_000_000),
    ("Science City", 9_500_000),
    ("Thaltej", 9_000_000),
    ("Sindhu Bhavan", 15_000_000),
    ("Satellite", 8_500_000),
    ("Prahlad Nagar", 8_800_000),
    ("Bopal", 6_000_000),
    ("Gota", 4_500_000),
    ("South Bopal", 5_500_000),
];

const BHK_DISTRIBUTION: [(u32, u64); 5] = [
    (1, 2_500_000),
    (2, 4_500_000),
    (3, 8_500_000),
    (4, 18_000_000),
    (5, 35_000_000),
];

impl AnalyticsReport {
    pub fn reference() -> Self {
        Self {
            top_locations: TOP_LOCATIONS
                .iter()
                .map(|&(name, price)| LocationPrice { name, price })
                .collect(),
            bhk_distribution: BHK_DISTRIBUTION
                .iter()
                .map(|&(bhk, avg_price)| BhkPrice { bhk, avg_price })
                .collect(),
        }
    }
}
