//! GeoJSON geometry values
//!
//! Only the serialized shape matters here: every geometry renders to the
//! `{ type, coordinates }` document the server expects under `$geometry`.

use bson::{Bson, Document, doc};

/// A longitude/latitude (or x/y) pair.
pub type Position = (f64, f64);

fn position_to_bson((x, y): Position) -> Bson {
    Bson::Array(vec![Bson::Double(x), Bson::Double(y)])
}

fn ring_to_bson(ring: &[Position]) -> Bson {
    Bson::Array(ring.iter().copied().map(position_to_bson).collect())
}

/// GeoJSON `Point`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Render as a GeoJSON document.
    pub fn to_document(&self) -> Document {
        doc! {
            "type": "Point",
            "coordinates": position_to_bson((self.x, self.y)),
        }
    }
}

/// GeoJSON `LineString`.
#[derive(Debug, Clone, PartialEq)]
pub struct LineString {
    pub positions: Vec<Position>,
}

impl LineString {
    pub fn new(positions: Vec<Position>) -> Self {
        Self { positions }
    }

    /// Render as a GeoJSON document.
    pub fn to_document(&self) -> Document {
        doc! {
            "type": "LineString",
            "coordinates": ring_to_bson(&self.positions),
        }
    }
}

/// GeoJSON `Polygon`: an exterior ring followed by optional holes.
///
/// Rings are not closed or validated here; a malformed polygon is
/// rejected by the server, not by the builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub rings: Vec<Vec<Position>>,
}

impl Polygon {
    pub fn new(exterior: Vec<Position>) -> Self {
        Self {
            rings: vec![exterior],
        }
    }

    pub fn with_hole(mut self, hole: Vec<Position>) -> Self {
        self.rings.push(hole);
        self
    }

    /// Render as a GeoJSON document.
    pub fn to_document(&self) -> Document {
        let rings: Vec<Bson> = self.rings.iter().map(|r| ring_to_bson(r)).collect();
        doc! {
            "type": "Polygon",
            "coordinates": rings,
        }
    }
}

/// Any geometry accepted by `$geometry` operands.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point),
    LineString(LineString),
    Polygon(Polygon),
    /// Pre-built GeoJSON document, passed through untouched.
    Raw(Document),
}

impl Geometry {
    pub fn to_document(&self) -> Document {
        match self {
            Geometry::Point(p) => p.to_document(),
            Geometry::LineString(l) => l.to_document(),
            Geometry::Polygon(p) => p.to_document(),
            Geometry::Raw(doc) => doc.clone(),
        }
    }
}

impl From<Point> for Geometry {
    fn from(p: Point) -> Self {
        Geometry::Point(p)
    }
}

impl From<LineString> for Geometry {
    fn from(l: LineString) -> Self {
        Geometry::LineString(l)
    }
}

impl From<Polygon> for Geometry {
    fn from(p: Polygon) -> Self {
        Geometry::Polygon(p)
    }
}

impl From<Document> for Geometry {
    fn from(doc: Document) -> Self {
        Geometry::Raw(doc)
    }
}

impl From<Geometry> for Bson {
    fn from(g: Geometry) -> Self {
        Bson::Document(g.to_document())
    }
}

impl From<Point> for Bson {
    fn from(p: Point) -> Self {
        Bson::Document(p.to_document())
    }
}

/// Target of a proximity search: a legacy coordinate pair or a GeoJSON point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NearPoint {
    Coordinates(f64, f64),
    Geometry(Point),
}

impl NearPoint {
    pub fn is_geometry(&self) -> bool {
        matches!(self, NearPoint::Geometry(_))
    }
}

impl From<(f64, f64)> for NearPoint {
    fn from((x, y): (f64, f64)) -> Self {
        NearPoint::Coordinates(x, y)
    }
}

impl From<Point> for NearPoint {
    fn from(p: Point) -> Self {
        NearPoint::Geometry(p)
    }
}

impl From<NearPoint> for Bson {
    fn from(near: NearPoint) -> Self {
        match near {
            NearPoint::Coordinates(x, y) => position_to_bson((x, y)),
            NearPoint::Geometry(p) => Bson::Document(p.to_document()),
        }
    }
}

/// Convert a list of positions into the legacy `[[x, y], ...]` form.
pub(crate) fn positions_to_bson(positions: &[Position]) -> Bson {
    ring_to_bson(positions)
}

pub(crate) fn pair_to_bson(position: Position) -> Bson {
    position_to_bson(position)
}
