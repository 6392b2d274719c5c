//! Seed knowledge base content
//!
//! A small curated set of worked explanations covering the core secondary
//! school topics. Seeded into the vector index at startup so the service
//! answers common questions without any external call.

use crate::index::{IndexedEntry, VectorIndex};
use mathagent_common::errors::Result;
use mathagent_common::providers::Embedder;
use std::sync::Arc;

/// A seed entry before embedding
pub struct SeedEntry {
    pub content: &'static str,
    pub source: &'static str,
}

/// The built-in knowledge entries
pub fn seed_entries() -> Vec<SeedEntry> {
    vec![
        SeedEntry {
            content: "To solve linear equations like 2x + 5 = 13, isolate the variable: \
                      subtract 5 from both sides to get 2x = 8, then divide both sides \
                      by 2 to get x = 4. Always verify by substituting back into the \
                      original equation: 2(4) + 5 = 13.",
            source: "Linear Equations Guide",
        },
        SeedEntry {
            content: "The power rule for derivatives states that the derivative of x^n \
                      is n*x^(n-1). For example, the derivative of x^2 is 2x, and the \
                      derivative of x^3 is 3x^2. Constants have a derivative of zero.",
            source: "Calculus Fundamentals",
        },
        SeedEntry {
            content: "The Pythagorean theorem relates the sides of a right triangle: \
                      a^2 + b^2 = c^2, where c is the hypotenuse. Given legs of 3 and \
                      4, the hypotenuse is sqrt(9 + 16) = sqrt(25) = 5.",
            source: "Geometry Essentials",
        },
        SeedEntry {
            content: "For a circle with radius r, the area is pi * r^2 and the \
                      circumference is 2 * pi * r. A circle with radius 5 has area \
                      25*pi (about 78.54) and circumference 10*pi (about 31.42).",
            source: "Geometry Essentials",
        },
        SeedEntry {
            content: "The power rule for integration is the reverse of differentiation: \
                      the integral of x^n dx is x^(n+1)/(n+1) + C, for n not equal to \
                      -1. For example, the integral of x^2 dx is x^3/3 + C.",
            source: "Calculus Fundamentals",
        },
    ]
}

/// Embed and load the seed entries into the index. Called once at startup;
/// a failure here is a startup failure, not a per-request degradation.
pub async fn seed_index(index: &dyn VectorIndex, embedder: &Arc<dyn Embedder>) -> Result<usize> {
    let entries = seed_entries();
    let count = entries.len();

    for seed in entries {
        let embedding = embedder.embed(seed.content).await?;
        index
            .add(IndexedEntry {
                content: seed.content.to_string(),
                source: seed.source.to_string(),
                embedding,
            })
            .await?;
    }

    tracing::info!(entries = count, "Knowledge index seeded");
    Ok(count)
}
