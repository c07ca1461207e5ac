//! Feature vectors and matrices bound to a [`FeatureSchema`].

use crate::error::{Error, Result};
use crate::features::schema::FeatureSchema;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// A single entity's weights over a feature space.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    schema: Arc<FeatureSchema>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Fails on a length other than the schema's dimension, or on a
    /// negative or non-finite weight.
    pub fn new(schema: Arc<FeatureSchema>, values: Vec<f64>) -> Result<Self> {
        check_row(&schema, &values)?;
        Ok(Self { schema, values })
    }

    /// Callers guarantee `values` has one entry per schema feature.
    pub(crate) fn from_parts(schema: Arc<FeatureSchema>, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), schema.dim());
        Self { schema, values }
    }

    pub fn zeros(schema: Arc<FeatureSchema>) -> Self {
        let values = vec![0.0; schema.dim()];
        Self { schema, values }
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Weight of the feature with column key `key`.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.schema.index_of(key).map(|i| self.values[i])
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// True when every weight is zero: the entity carries no usable signal.
    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    /// Values reordered into `schema`'s feature order.
    pub fn aligned_to(&self, schema: &FeatureSchema) -> Result<Vec<f64>> {
        schema.align(&self.schema, &self.values)
    }
}

/// Rows of feature vectors keyed by entity identifier, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    schema: Arc<FeatureSchema>,
    ids: Vec<String>,
    rows: Vec<Vec<f64>>,
    positions: HashMap<String, usize>,
}

impl FeatureMatrix {
    pub fn new(schema: Arc<FeatureSchema>) -> Self {
        Self {
            schema,
            ids: Vec::new(),
            rows: Vec::new(),
            positions: HashMap::new(),
        }
    }

    pub fn from_rows(
        schema: Arc<FeatureSchema>,
        rows: impl IntoIterator<Item = (String, Vec<f64>)>,
    ) -> Result<Self> {
        let mut matrix = Self::new(schema);
        for (id, values) in rows {
            matrix.push_row(id, values)?;
        }
        Ok(matrix)
    }

    /// Map an external table onto the schema.
    ///
    /// `header` names the columns of each row. Every schema key must be
    /// present; columns the schema does not know are dropped.
    pub fn from_named_columns<S: AsRef<str>>(
        schema: Arc<FeatureSchema>,
        header: &[S],
        rows: impl IntoIterator<Item = (String, Vec<f64>)>,
    ) -> Result<Self> {
        let mut column_for_feature = vec![None; schema.dim()];
        for (col, name) in header.iter().enumerate() {
            match schema.index_of(name.as_ref()) {
                Some(feature) => column_for_feature[feature] = Some(col),
                None => warn!(column = name.as_ref(), "ignoring column outside the feature schema"),
            }
        }

        let columns = column_for_feature
            .iter()
            .enumerate()
            .map(|(feature, col)| {
                col.ok_or_else(|| {
                    Error::SchemaMismatch(format!(
                        "table has no column for feature {}",
                        schema.key(feature).unwrap_or_default()
                    ))
                })
            })
            .collect::<Result<Vec<usize>>>()?;

        let mut matrix = Self::new(schema);
        for (id, values) in rows {
            if values.len() != header.len() {
                return Err(Error::DimensionMismatch {
                    expected: header.len(),
                    found: values.len(),
                });
            }
            let row = columns.iter().map(|&col| values[col]).collect();
            matrix.push_row(id, row)?;
        }
        Ok(matrix)
    }

    /// Append a row. A repeated identifier keeps its first position for lookups.
    ///
    /// Weights must be finite and non-negative.
    pub fn push_row(&mut self, id: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let id = id.into();
        if let Err(e) = check_row(&self.schema, &values) {
            warn!(entity = %id, error = %e, "rejected feature row");
            return Err(e);
        }
        self.positions.entry(id.clone()).or_insert(self.rows.len());
        self.ids.push(id);
        self.rows.push(values);
        Ok(())
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn row_by_id(&self, id: &str) -> Option<&[f64]> {
        self.position(id).and_then(|i| self.row(i))
    }

    pub fn vector(&self, index: usize) -> Option<FeatureVector> {
        self.rows.get(index).map(|values| FeatureVector {
            schema: Arc::clone(&self.schema),
            values: values.clone(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.ids
            .iter()
            .zip(self.rows.iter())
            .map(|(id, row)| (id.as_str(), row.as_slice()))
    }

    /// Resolve entity identifiers to row positions, failing on unknown ids.
    pub fn positions_of<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<usize>> {
        ids.iter()
            .map(|id| {
                self.position(id.as_ref())
                    .ok_or_else(|| Error::UnknownEntity(id.as_ref().to_string()))
            })
            .collect()
    }

    /// Feature-wise arithmetic mean of the given rows. No rows gives the zero vector.
    pub fn mean_of(&self, positions: &[usize]) -> Vec<f64> {
        let mut mean = vec![0.0; self.schema.dim()];
        if positions.is_empty() {
            return mean;
        }
        for &p in positions {
            for (m, v) in mean.iter_mut().zip(&self.rows[p]) {
                *m += v;
            }
        }
        let n = positions.len() as f64;
        for m in &mut mean {
            *m /= n;
        }
        mean
    }

    /// A new matrix with the same ids and schema and each row transformed by `f`.
    pub fn map_rows(&self, mut f: impl FnMut(&[f64]) -> Vec<f64>) -> FeatureMatrix {
        FeatureMatrix {
            schema: Arc::clone(&self.schema),
            ids: self.ids.clone(),
            rows: self.rows.iter().map(|r| f(r.as_slice())).collect(),
            positions: self.positions.clone(),
        }
    }
}

fn check_row(schema: &FeatureSchema, values: &[f64]) -> Result<()> {
    if values.len() != schema.dim() {
        return Err(Error::DimensionMismatch {
            expected: schema.dim(),
            found: values.len(),
        });
    }
    match values.iter().position(|v| !v.is_finite() || *v < 0.0) {
        Some(i) => Err(Error::InvalidWeight {
            feature: schema.key(i).unwrap_or_default(),
            value: values[i],
        }),
        None => Ok(()),
    }
}
