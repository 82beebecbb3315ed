//! Expression graphs for the `value:compute` endpoint.
//!
//! An expression is a flat table of named value nodes plus the name of the
//! result node. Nodes reference each other with `valueReference`, which lets
//! the filtered collection and the AOI geometry be shared between calls.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Map, Value};
use water_common::{BoundingBox, MonthRange};

use crate::query::WaterQuery;

/// A `constantValue` node.
pub fn constant(value: impl Serialize) -> Value {
    json!({ "constantValue": value })
}

/// A `functionInvocationValue` node.
pub fn call(function_name: &str, arguments: Vec<(&str, Value)>) -> Value {
    let arguments: Map<String, Value> = arguments
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();

    json!({
        "functionInvocationValue": {
            "functionName": function_name,
            "arguments": arguments,
        }
    })
}

/// Builder for a `{ "values": {...}, "result": "<id>" }` expression.
#[derive(Debug, Default)]
pub struct ExpressionGraph {
    values: BTreeMap<String, Value>,
}

impl ExpressionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a node under a fresh id and return a reference to it.
    pub fn bind(&mut self, node: Value) -> Value {
        let id = self.values.len().to_string();
        self.values.insert(id.clone(), node);
        json!({ "valueReference": id })
    }

    /// Finish the graph with `result` as its output node.
    pub fn finish(mut self, result: Value) -> Value {
        let id = self.values.len().to_string();
        self.values.insert(id.clone(), result);
        json!({ "values": self.values, "result": id })
    }
}

/// Axis-aligned rectangle; edge interpretation is left to the server default.
pub fn rectangle(bbox: &BoundingBox) -> Value {
    call(
        "GeometryConstructors.Rectangle",
        vec![("coordinates", constant(bbox.to_array()))],
    )
}

fn date(value: chrono::NaiveDate) -> Value {
    call(
        "Date",
        vec![("value", constant(value.format("%Y-%m-%d").to_string()))],
    )
}

/// The collection filtered to the AOI and the month.
fn filtered_collection(query: &WaterQuery, month: &MonthRange, aoi: &Value) -> Value {
    let loaded = call(
        "ImageCollection.load",
        vec![("id", constant(&query.dataset.collection_id))],
    );

    let bounded = call(
        "Collection.filter",
        vec![
            ("collection", loaded),
            (
                "filter",
                call(
                    "Filter.intersects",
                    vec![("leftField", constant(".all")), ("rightValue", aoi.clone())],
                ),
            ),
        ],
    );

    call(
        "Collection.filter",
        vec![
            ("collection", bounded),
            (
                "filter",
                call(
                    "Filter.dateRangeContains",
                    vec![
                        (
                            "leftValue",
                            call(
                                "DateRange",
                                vec![("start", date(month.start)), ("end", date(month.end))],
                            ),
                        ),
                        ("rightField", constant("system:time_start")),
                    ],
                ),
            ),
        ],
    )
}

/// Number of images in the collection for the month.
pub fn image_count_expression(query: &WaterQuery, month: &MonthRange) -> Value {
    let mut graph = ExpressionGraph::new();
    let aoi = graph.bind(rectangle(&query.bbox));
    let collection = filtered_collection(query, month, &aoi);

    graph.finish(call("Collection.size", vec![("collection", collection)]))
}

/// Sum over the AOI of a constant-one image masked by `mean(band) > threshold`.
///
/// The result is a dictionary keyed by `constant`.
pub fn water_pixel_count_expression(query: &WaterQuery, month: &MonthRange) -> Value {
    let mut graph = ExpressionGraph::new();
    let aoi = graph.bind(rectangle(&query.bbox));
    let collection = filtered_collection(query, month, &aoi);

    let monthly_mean = call(
        "Image.select",
        vec![
            (
                "input",
                call("ImageCollection.mean", vec![("collection", collection)]),
            ),
            ("bandSelectors", constant([&query.dataset.band])),
        ],
    );

    let binary = call(
        "Image.gt",
        vec![
            ("image1", monthly_mean),
            (
                "image2",
                call("Image.constant", vec![("value", constant(query.threshold))]),
            ),
        ],
    );

    let ones = call(
        "Image.updateMask",
        vec![
            ("image", call("Image.constant", vec![("value", constant(1))])),
            ("mask", binary),
        ],
    );

    graph.finish(call(
        "Image.reduceRegion",
        vec![
            ("image", ones),
            ("reducer", call("Reducer.sum", vec![])),
            ("geometry", aoi),
            ("scale", constant(query.dataset.scale_m)),
            ("maxPixels", constant(query.dataset.max_pixels)),
            ("bestEffort", constant(query.dataset.best_effort)),
        ],
    ))
}
