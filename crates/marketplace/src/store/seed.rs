//! Fixed seed data.

use farm_connect_core::FarmerId;

use crate::images::{placeholder_url, sizes, with_image_hint};
use crate::models::Farmer;

/// Display hint attached to farmer portraits.
pub const FARMER_PORTRAIT_HINT: &str = "farmer portrait";

/// The three seed farmers, portraits hinted.
pub fn farmers() -> Vec<Farmer> {
    let mut farmers = vec![
        Farmer {
            id: FarmerId::new("farmer1"),
            name: "Green Acres Farm".to_string(),
            location: "Willow Creek, CA".to_string(),
            phone_number: "555-0101".to_string(),
            profile_picture_url: Some(placeholder_url(sizes::SEED_PORTRAIT)),
            bio: "We specialize in organic vegetables and free-range eggs. \
                  Committed to sustainable farming practices."
                .to_string(),
        },
        Farmer {
            id: FarmerId::new("farmer2"),
            name: "Sunny Orchard".to_string(),
            location: "Sunshine Valley, FL".to_string(),
            phone_number: "555-0102".to_string(),
            profile_picture_url: Some(placeholder_url(sizes::SEED_PORTRAIT)),
            bio: "Fresh, juicy fruits picked daily from our sun-kissed orchards. \
                  Taste the difference!"
                .to_string(),
        },
        Farmer {
            id: FarmerId::new("farmer3"),
            name: "Golden Grain Fields".to_string(),
            location: "Harvest Plains, KS".to_string(),
            phone_number: "555-0103".to_string(),
            profile_picture_url: None,
            bio: "High-quality grains including wheat, corn, and barley. \
                  Perfect for baking or animal feed."
                .to_string(),
        },
    ];

    for farmer in &mut farmers {
        hint_portrait(farmer);
    }
    farmers
}

/// Give a farmer a hinted placeholder portrait.
///
/// Placeholder portraits without a hint get one; farmers without a portrait
/// get the default placeholder. Other URLs are left alone.
pub fn hint_portrait(farmer: &mut Farmer) {
    let url = farmer
        .profile_picture_url
        .as_deref()
        .map_or_else(|| placeholder_url(sizes::SEED_PORTRAIT), str::to_owned);
    farmer.profile_picture_url = Some(with_image_hint(&url, FARMER_PORTRAIT_HINT));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::images::embedded_image_hint;

    #[test]
    fn test_seed_farmers_have_hinted_portraits() {
        let farmers = farmers();
        assert_eq!(farmers.len(), 3);
        for farmer in &farmers {
            let url = farmer.profile_picture_url.as_deref().unwrap();
            assert_eq!(
                url,
                r#"https://placehold.co/100x100.png" data-ai-hint="farmer portrait"#
            );
            assert_eq!(embedded_image_hint(url), Some(FARMER_PORTRAIT_HINT));
        }
    }

    #[test]
    fn test_hint_portrait_leaves_real_urls() {
        let mut farmer = farmers().remove(0);
        farmer.profile_picture_url = Some("https://cdn.example.com/me.jpg".to_string());
        hint_portrait(&mut farmer);
        assert_eq!(
            farmer.profile_picture_url.as_deref(),
            Some("https://cdn.example.com/me.jpg")
        );
    }
}
