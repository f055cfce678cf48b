//! Positional reconciliation of descriptions and first-frame images.
//!
//! Upstream phases emit the two collections independently, so they can
//! arrive mis-sized or with disagreeing indices. Reconciliation is a
//! best-effort positional repair, not a semantic match: it prefers
//! exact index agreement and otherwise claims images in input order.

use tracing::warn;

use reel_models::{FirstFrameImage, VideoDescription};

use crate::error::{PipelineError, PipelineResult};

/// One reconciled pairing for a target slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledScene {
    /// Target slot, `0..min(d, m)`
    pub slot: usize,
    pub description: VideoDescription,
    pub image: FirstFrameImage,
}

/// Pair descriptions with first-frame images, one per target slot.
///
/// Mis-sized collections are truncated to the shorter length without
/// reordering. For each slot the image whose own index matches is
/// preferred; failing that, the first image (in input order) not yet
/// claimed by an earlier slot is relabeled to the slot.
pub fn reconcile(
    descriptions: &[VideoDescription],
    images: &[FirstFrameImage],
) -> PipelineResult<Vec<ReconciledScene>> {
    let count = descriptions.len().min(images.len());
    if count == 0 {
        return Err(PipelineError::InsufficientData);
    }

    if descriptions.len() != images.len() {
        warn!(
            descriptions = descriptions.len(),
            images = images.len(),
            truncated_to = count,
            "Description and image counts disagree, truncating"
        );
    }

    let descriptions = &descriptions[..count];
    let images = &images[..count];

    let mut claimed = vec![false; count];
    let mut scenes = Vec::with_capacity(count);

    for (slot, description) in descriptions.iter().enumerate() {
        // Prefer the image that already carries this slot's index
        let position = images
            .iter()
            .position(|img| img.index == slot)
            .or_else(|| {
                // Fall back to the first unclaimed image in input order
                images
                    .iter()
                    .enumerate()
                    .position(|(i, _)| !claimed[i])
                    .inspect(|i| {
                        warn!(
                            slot = slot,
                            original_index = images[*i].index,
                            "No exact-index image for slot, claiming by position"
                        );
                    })
            })
            .ok_or(PipelineError::UnresolvedSlot { slot })?;

        claimed[position] = true;
        let mut image = images[position].clone();
        image.index = slot;

        scenes.push(ReconciledScene {
            slot,
            description: description.clone(),
            image,
        });
    }

    Ok(scenes)
}
