//! Argument extraction for chain methods

use bson::{Bson, Document};

use crate::error::{ParseError, Result};
use crate::expr::{Geometry, NearPoint, Point, Position};

/// Typed access to the positional arguments of one chain method.
pub struct ArgParser<'a> {
    method: &'a str,
    args: &'a [Bson],
}

impl<'a> ArgParser<'a> {
    pub fn new(method: &'a str, args: &'a [Bson]) -> Self {
        Self { method, args }
    }

    fn missing(&self, index: usize) -> ParseError {
        ParseError::MissingArgument {
            method: self.method.to_string(),
            index,
        }
    }

    fn invalid(&self, index: usize, expected: &'static str) -> ParseError {
        ParseError::InvalidArgument {
            method: self.method.to_string(),
            index,
            expected,
        }
    }

    /// Argument at `index`, treating an explicit `null` as absent.
    pub fn optional(&self, index: usize) -> Option<&'a Bson> {
        match self.args.get(index) {
            Some(Bson::Null) | None => None,
            Some(value) => Some(value),
        }
    }

    pub fn value(&self, index: usize) -> Result<Bson> {
        self.optional(index)
            .cloned()
            .ok_or_else(|| self.missing(index).into())
    }

    pub fn string(&self, index: usize) -> Result<String> {
        match self.optional(index) {
            Some(Bson::String(s)) => Ok(s.clone()),
            Some(_) => Err(self.invalid(index, "a string").into()),
            None => Err(self.missing(index).into()),
        }
    }

    pub fn optional_string(&self, index: usize) -> Result<Option<String>> {
        match self.optional(index) {
            Some(_) => self.string(index).map(Some),
            None => Ok(None),
        }
    }

    pub fn f64(&self, index: usize) -> Result<f64> {
        match self.optional(index) {
            Some(Bson::Double(n)) => Ok(*n),
            Some(Bson::Int32(n)) => Ok(f64::from(*n)),
            Some(Bson::Int64(n)) => Ok(*n as f64),
            Some(_) => Err(self.invalid(index, "a number").into()),
            None => Err(self.missing(index).into()),
        }
    }

    pub fn i64(&self, index: usize) -> Result<i64> {
        match self.optional(index) {
            Some(Bson::Int32(n)) => Ok(i64::from(*n)),
            Some(Bson::Int64(n)) => Ok(*n),
            Some(Bson::Double(n)) if n.fract() == 0.0 => Ok(*n as i64),
            Some(_) => Err(self.invalid(index, "an integer").into()),
            None => Err(self.missing(index).into()),
        }
    }

    pub fn optional_i64(&self, index: usize) -> Result<Option<i64>> {
        match self.optional(index) {
            Some(_) => self.i64(index).map(Some),
            None => Ok(None),
        }
    }

    pub fn bool_or(&self, index: usize, default: bool) -> Result<bool> {
        match self.optional(index) {
            Some(Bson::Boolean(b)) => Ok(*b),
            Some(_) => Err(self.invalid(index, "a boolean").into()),
            None => Ok(default),
        }
    }

    pub fn document(&self, index: usize) -> Result<Document> {
        match self.optional(index) {
            Some(Bson::Document(doc)) => Ok(doc.clone()),
            Some(_) => Err(self.invalid(index, "an object").into()),
            None => Err(self.missing(index).into()),
        }
    }

    pub fn optional_document(&self, index: usize) -> Result<Option<Document>> {
        match self.optional(index) {
            Some(_) => self.document(index).map(Some),
            None => Ok(None),
        }
    }

    /// Field names given either as one array argument or as the remaining
    /// string arguments.
    pub fn strings_from(&self, index: usize) -> Result<Vec<String>> {
        let values: &[Bson] = match self.optional(index) {
            Some(Bson::Array(items)) => items.as_slice(),
            Some(_) => &self.args[index..],
            None => return Ok(Vec::new()),
        };
        values
            .iter()
            .map(|value| match value {
                Bson::String(s) => Ok(s.clone()),
                _ => Err(self.invalid(index, "field name strings").into()),
            })
            .collect()
    }

    fn pair(&self, index: usize, value: &Bson) -> Result<Position> {
        let Bson::Array(items) = value else {
            return Err(self.invalid(index, "an [x, y] pair").into());
        };
        let coordinate = |value: &Bson| match value {
            Bson::Double(n) => Some(*n),
            Bson::Int32(n) => Some(f64::from(*n)),
            Bson::Int64(n) => Some(*n as f64),
            _ => None,
        };
        match items.as_slice() {
            [x, y] => match (coordinate(x), coordinate(y)) {
                (Some(x), Some(y)) => Ok((x, y)),
                _ => Err(self.invalid(index, "an [x, y] pair").into()),
            },
            _ => Err(self.invalid(index, "an [x, y] pair").into()),
        }
    }

    /// Points given either as one array of pairs or as the remaining
    /// pair arguments.
    pub fn positions_from(&self, index: usize) -> Result<Vec<Position>> {
        let values: &[Bson] = match self.optional(index) {
            Some(Bson::Array(items)) if items.first().is_some_and(|v| v.as_array().is_some()) => {
                items.as_slice()
            }
            Some(_) => &self.args[index..],
            None => return Err(self.missing(index).into()),
        };
        values.iter().map(|value| self.pair(index, value)).collect()
    }

    /// A proximity target: `x, y` numbers, an `[x, y]` pair, or a GeoJSON
    /// point document.
    pub fn near_point(&self, index: usize) -> Result<NearPoint> {
        match self.optional(index) {
            Some(Bson::Document(doc)) => {
                let coordinates = doc
                    .get("coordinates")
                    .ok_or_else(|| self.invalid(index, "a GeoJSON point"))?;
                let (x, y) = self.pair(index, coordinates)?;
                Ok(NearPoint::Geometry(Point::new(x, y)))
            }
            Some(array @ Bson::Array(_)) => {
                let (x, y) = self.pair(index, array)?;
                Ok(NearPoint::Coordinates(x, y))
            }
            Some(_) => Ok(NearPoint::Coordinates(self.f64(index)?, self.f64(index + 1)?)),
            None => Err(self.missing(index).into()),
        }
    }

    /// A GeoJSON document, passed through as-is.
    pub fn geometry(&self, index: usize) -> Result<Geometry> {
        Ok(Geometry::Raw(self.document(index)?))
    }
}
