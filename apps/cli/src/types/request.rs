// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request payloads.

use roofsolid_geometry::{InputPolygon, Point3};
use serde::Deserialize;

/// A polygon batch in any of the accepted shapes.
///
/// `sets` is the message-bus payload and `roofs` the HTTP payload; both carry
/// roof polygons only. `polygons` tags each polygon with its role.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AnalyzeRequest {
    Sets { sets: Vec<Vec<Point3<f64>>> },
    Roofs { roofs: Vec<Vec<Point3<f64>>> },
    Polygons { polygons: Vec<InputPolygon> },
}

impl AnalyzeRequest {
    pub fn into_polygons(self) -> Vec<InputPolygon> {
        match self {
            AnalyzeRequest::Sets { sets: rings } | AnalyzeRequest::Roofs { roofs: rings } => {
                rings.into_iter().map(InputPolygon::roof).collect()
            }
            AnalyzeRequest::Polygons { polygons } => polygons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roofsolid_geometry::Role;

    #[test]
    fn test_sets_payload() {
        let json = r#"{"sets": [[[0,0,0],[1,0,0],[0,1,0]]]}"#;
        let request: AnalyzeRequest = serde_json::from_str(json).unwrap();
        let polygons = request.into_polygons();
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].role, Role::Roof);
        assert_eq!(polygons[0].points[1], Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_roofs_payload() {
        let json = r#"{"roofs": [[[0,0,0],[1,0,0],[0,1,0]], [[5,5,5],[6,5,5]]]}"#;
        let request: AnalyzeRequest = serde_json::from_str(json).unwrap();
        assert!(matches!(request, AnalyzeRequest::Roofs { .. }));
        assert_eq!(request.into_polygons().len(), 2);
    }

    #[test]
    fn test_tagged_polygons_payload() {
        let json = r#"{"polygons": [
            {"role": "base", "points": [[0,0,0],[1,0,0],[0,1,0]]},
            {"points": [[0,0,1],[1,0,1],[0,1,1]]}
        ]}"#;
        let polygons = serde_json::from_str::<AnalyzeRequest>(json)
            .unwrap()
            .into_polygons();
        assert_eq!(polygons[0].role, Role::Base);
        assert_eq!(polygons[1].role, Role::Roof);
    }

    #[test]
    fn test_unknown_shape_is_rejected() {
        assert!(serde_json::from_str::<AnalyzeRequest>(r#"{"shapes": []}"#).is_err());
        assert!(serde_json::from_str::<AnalyzeRequest>(r#"{"sets": [[[0,0]]]}"#).is_err());
    }
}
