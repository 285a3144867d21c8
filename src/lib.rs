#[cfg(feature = "cli")]
pub mod cli;
pub mod colormap;
pub mod config;
pub mod dot;
pub mod dump;
pub mod error;
pub mod geo;
pub mod ir;
pub mod layout;
pub mod scene;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, load_config};
pub use error::GeometryError;
pub use geo::{GeoPoint, distance, great_circle_distance, tour_length};
pub use ir::{GraphInput, LinkRecord, MatchId, NodeRecord, parse_graph};
pub use layout::{
    CurvatureAssignment, Declutter, EdgeKey, LabelSet, Point2D, assign_curvatures, declutter,
    offsets_for_count,
};
pub use scene::{RouteScene, plan_pattern_solution, plan_tour};
pub use theme::Theme;
