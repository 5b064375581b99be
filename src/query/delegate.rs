//! Forwarding surface to the owned accumulator
//!
//! These methods hold no builder state of their own. The one exception is
//! `set`, which never uses the atomic form for inserts.

use bson::{Bson, Document};

use super::builder::Builder;
use super::config::OperationType;
use crate::expr::{Geometry, NearPoint, Position};

macro_rules! forward {
    ($( $(#[$meta:meta])* $name:ident ( $( $arg:ident : $ty:ty ),* ); )+) => {
        $(
            $(#[$meta])*
            pub fn $name(&mut self $(, $arg: $ty)*) -> &mut Self {
                self.expr.$name($($arg),*);
                self
            }
        )+
    };
}

impl Builder {
    /// Select the field subsequent predicates and update operators apply to.
    pub fn field(&mut self, name: impl Into<String>) -> &mut Self {
        self.expr.field(name);
        self
    }

    /// The accumulated criteria document.
    pub fn get_query_array(&self) -> &Document {
        self.expr.get_query()
    }

    pub fn set_query_array(&mut self, query: Document) -> &mut Self {
        self.expr.set_query(query);
        self
    }

    /// The accumulated mutation document.
    pub fn get_new_obj(&self) -> &Document {
        self.expr.get_new_obj()
    }

    pub fn set_new_obj(&mut self, new_obj: Document) -> &mut Self {
        self.expr.set_new_obj(new_obj);
        self
    }

    /// Assign a value to the current field. Inserts always get a plain
    /// assignment, whatever `atomic` says.
    pub fn set(&mut self, value: impl Into<Bson>, atomic: bool) -> &mut Self {
        let atomic = atomic && self.config.operation != OperationType::Insert;
        self.expr.set(value, atomic);
        self
    }

    forward! {
        equals(value: impl Into<Bson>);
        not_equal(value: impl Into<Bson>);
        in_values(values: impl Into<Bson>);
        not_in(values: impl Into<Bson>);
        gt(value: impl Into<Bson>);
        gte(value: impl Into<Bson>);
        lt(value: impl Into<Bson>);
        lte(value: impl Into<Bson>);
        range(start: impl Into<Bson>, end: impl Into<Bson>);
        size(size: i64);
        exists(exists: bool);
        bson_type(type_spec: impl Into<Bson>);
        all(values: impl Into<Bson>);
        modulo(divisor: impl Into<Bson>, remainder: impl Into<Bson>);
        where_js(code: impl Into<String>);
        text(search: impl Into<String>);
        language(language: impl Into<String>);
        comment(comment: impl Into<String>);
    }

    forward! {
        near(point: impl Into<NearPoint>);
        near_sphere(point: impl Into<NearPoint>);
        within_box(x1: f64, y1: f64, x2: f64, y2: f64);
        within_center(x: f64, y: f64, radius: f64);
        within_center_sphere(x: f64, y: f64, radius: f64);
        within_polygon(points: &[Position]);
        geo_within_box(x1: f64, y1: f64, x2: f64, y2: f64);
        geo_within_center(x: f64, y: f64, radius: f64);
        geo_within_center_sphere(x: f64, y: f64, radius: f64);
        geo_within_polygon(points: &[Position]);
        geo_within(geometry: impl Into<Geometry>);
        geo_intersects(geometry: impl Into<Geometry>);
    }

    forward! {
        set_on_insert(value: impl Into<Bson>);
        inc(value: impl Into<Bson>);
        mul(value: impl Into<Bson>);
        min(value: impl Into<Bson>);
        max(value: impl Into<Bson>);
        rename(new_name: impl Into<String>);
        current_date(date_type: &str);
        unset_field();
        push(value: impl Into<Bson>);
        push_all(values: impl Into<Bson>);
        add_to_set(value: impl Into<Bson>);
        add_many_to_set(values: impl Into<Bson>);
        pop_first();
        pop_last();
        pull(value: impl Into<Bson>);
        pull_all(values: impl Into<Bson>);
        bit_and(value: i64);
        bit_or(value: i64);
        bit_xor(value: i64);
    }

    forward! {
        add_or(criteria: impl Into<Bson>);
        add_and(criteria: impl Into<Bson>);
        add_nor(criteria: impl Into<Bson>);
        elem_match(criteria: impl Into<Bson>);
        #[allow(clippy::should_implement_trait)]
        not(criteria: impl Into<Bson>);
    }
}
