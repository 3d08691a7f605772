//! Conversion of provider businesses into [`Candidate`]s.

use foodme_core::{Candidate, Coordinates, PriceTier};

use crate::types::Business;

/// Converts one business into a candidate.
///
/// Returns `None` when the business has no usable distance, since every
/// candidate must carry a finite, non-negative distance.
#[must_use]
pub fn normalize_business(business: Business) -> Option<Candidate> {
    let distance = business
        .distance
        .filter(|d| d.is_finite() && *d >= 0.0)?;

    let price = business
        .price
        .as_deref()
        .and_then(|p| p.parse::<PriceTier>().ok());

    let mut cuisines: Vec<String> = Vec::with_capacity(business.categories.len());
    for category in business.categories {
        let alias = category.alias.trim().to_lowercase();
        if !alias.is_empty() && !cuisines.contains(&alias) {
            cuisines.push(alias);
        }
    }

    let coordinates = business.coordinates.and_then(|c| match (c.latitude, c.longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        _ => None,
    });

    let address = business
        .location
        .map(|l| l.display_address.join(", "))
        .filter(|a| !a.is_empty());

    Some(Candidate {
        id: business.id,
        name: business.name,
        distance,
        price,
        cuisines,
        rating: business.rating.unwrap_or(0.0),
        review_count: business.review_count,
        address,
        coordinates,
        url: business.url,
        image_url: business.image_url,
    })
}
