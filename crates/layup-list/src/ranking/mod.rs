//! Ranked course lists ("Best Classes" and "Layups") built from aggregate scores.

pub mod pagination;
pub mod view;

pub use pagination::{PageWindow, Paginator};
pub use view::{ensure_access, RankedCourse, Ranking, RankingError, RankingMode, RankingView};
