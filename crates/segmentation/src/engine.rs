//! Segment tree — named, read-only views over the root dataset.
//!
//! Each segment stores the indices of its records in the root dataset rather
//! than a copy of them, plus the parent it was filtered from and the
//! predicate used, so provenance can be walked back to the root.

use catalog_core::{CatalogError, CatalogResult, Dataset, ProductRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::builder::SegmentSpec;
use crate::predicates::{filter_indices, TextPredicate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId(pub usize);

impl SegmentId {
    pub const ROOT: SegmentId = SegmentId(0);
}

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    pub id: SegmentId,
    pub name: String,
    pub parent: Option<SegmentId>,
    /// `None` only for the root.
    pub predicate: Option<TextPredicate>,
    pub depth: usize,
    indices: Vec<usize>,
}

impl Segment {
    /// Root-dataset indices of the member records, in source order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

pub struct SegmentationEngine {
    dataset: Dataset,
    segments: Vec<Segment>,
}

impl SegmentationEngine {
    pub const ROOT_NAME: &'static str = "all";

    pub fn new(dataset: Dataset) -> Self {
        let root = Segment {
            id: SegmentId::ROOT,
            name: Self::ROOT_NAME.to_string(),
            parent: None,
            predicate: None,
            depth: 0,
            indices: (0..dataset.len()).collect(),
        };
        Self {
            dataset,
            segments: vec![root],
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn root(&self) -> &Segment {
        &self.segments[0]
    }

    /// Derive a new segment from `source` holding every member record whose
    /// field contains the predicate's substring.
    pub fn filter_segment(
        &mut self,
        source: SegmentId,
        name: impl Into<String>,
        predicate: TextPredicate,
    ) -> CatalogResult<SegmentId> {
        let parent = self.segment(source)?;
        let indices = filter_indices(&self.dataset, parent.indices(), &predicate);
        let depth = parent.depth + 1;
        let source_len = parent.len();

        let id = SegmentId(self.segments.len());
        let name = name.into();
        info!(
            segment = %name,
            parent = %source,
            predicate = %predicate,
            records = indices.len(),
            source_records = source_len,
            "Segment filtered"
        );
        self.segments.push(Segment {
            id,
            name,
            parent: Some(source),
            predicate: Some(predicate),
            depth,
            indices,
        });
        Ok(id)
    }

    pub fn segment(&self, id: SegmentId) -> CatalogResult<&Segment> {
        self.segments
            .get(id.0)
            .ok_or(CatalogError::UnknownSegment(id.0))
    }

    /// Member records paired with their root-dataset index.
    pub fn records(
        &self,
        id: SegmentId,
    ) -> CatalogResult<impl Iterator<Item = (usize, &ProductRecord)> + '_> {
        let segment = self.segment(id)?;
        let dataset = &self.dataset;
        Ok(segment
            .indices()
            .iter()
            .filter_map(move |&i| dataset.get(i).map(|r| (i, r))))
    }

    /// Segments from the root down to `id`, inclusive.
    pub fn lineage(&self, id: SegmentId) -> CatalogResult<Vec<&Segment>> {
        let mut chain = vec![self.segment(id)?];
        while let Some(parent) = chain.last().and_then(|s| s.parent) {
            chain.push(self.segment(parent)?);
        }
        chain.reverse();
        Ok(chain)
    }

    /// Human-readable path such as `Gift / Painting`. The root is omitted
    /// unless it is the segment itself.
    pub fn path_name(&self, id: SegmentId) -> CatalogResult<String> {
        let lineage = self.lineage(id)?;
        if lineage.len() == 1 {
            return Ok(lineage[0].name.clone());
        }
        Ok(lineage[1..]
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(" / "))
    }

    pub fn children(&self, id: SegmentId) -> Vec<&Segment> {
        self.segments
            .iter()
            .filter(|s| s.parent == Some(id))
            .collect()
    }

    pub fn list_segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Materialize a plan depth-first under the root. Returns the ids of
    /// the areas of interest in plan order.
    pub fn apply_plan(&mut self, plan: &[SegmentSpec]) -> CatalogResult<Vec<SegmentId>> {
        let mut areas = Vec::new();
        for spec in plan {
            self.apply_spec(SegmentId::ROOT, spec, &mut areas)?;
        }
        debug!(
            areas = areas.len(),
            segments = self.segments.len() - 1,
            "Plan applied"
        );
        Ok(areas)
    }

    fn apply_spec(
        &mut self,
        parent: SegmentId,
        spec: &SegmentSpec,
        areas: &mut Vec<SegmentId>,
    ) -> CatalogResult<()> {
        let id = self.filter_segment(parent, spec.name.clone(), spec.predicate.clone())?;
        if spec.is_area_of_interest() {
            areas.push(id);
        }
        for child in &spec.children {
            self.apply_spec(id, child, areas)?;
        }
        Ok(())
    }
}
