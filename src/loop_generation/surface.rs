use crate::routing_common::api::{SurfaceMatch, SurfaceScore};
use crate::routing_common::{BikeProfile, RoadNetwork};
use tracing::debug;

/// Surface tag preferences of one bike type. Tags in none of the lists score
/// 0 like the `bad` ones, but are logged as unrecognized.
#[derive(Debug, Clone, Copy)]
pub struct SurfacePreferences {
    pub good: &'static [&'static str],
    pub neutral: &'static [&'static str],
    pub bad: &'static [&'static str],
}

const ROAD_BIKE: SurfacePreferences = SurfacePreferences {
    good: &["asphalt", "concrete", "paved"],
    neutral: &["sett", "unpaved"],
    bad: &["gravel", "cobblestone", "dirt", "sand", "grass", "ground"],
};

const GRAVEL: SurfacePreferences = SurfacePreferences {
    good: &["asphalt", "gravel", "unpaved", "dirt", "compacted"],
    neutral: &["concrete", "sett", "cobblestone"],
    bad: &["sand", "grass"],
};

const MOUNTAIN_BIKE: SurfacePreferences = SurfacePreferences {
    good: &[
        "gravel",
        "dirt",
        "sand",
        "grass",
        "ground",
        "cobblestone",
        "unpaved",
    ],
    neutral: &["asphalt", "concrete", "sett"],
    bad: &[],
};

const NO_PREFERENCE: SurfacePreferences = SurfacePreferences {
    good: &[],
    neutral: &[],
    bad: &[],
};

impl BikeProfile {
    pub fn surface_preferences(&self) -> &'static SurfacePreferences {
        match self {
            BikeProfile::RoadBike => &ROAD_BIKE,
            BikeProfile::Gravel => &GRAVEL,
            BikeProfile::MountainBike => &MOUNTAIN_BIKE,
            BikeProfile::None => &NO_PREFERENCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceClass {
    Good,
    Neutral,
    Bad,
    Unknown,
}

impl SurfaceClass {
    pub fn score(self) -> f64 {
        match self {
            SurfaceClass::Good => 1.0,
            SurfaceClass::Neutral => 0.5,
            SurfaceClass::Bad | SurfaceClass::Unknown => 0.0,
        }
    }
}

impl SurfacePreferences {
    pub fn classify(&self, surface: &str) -> SurfaceClass {
        if self.good.contains(&surface) {
            SurfaceClass::Good
        } else if self.neutral.contains(&surface) {
            SurfaceClass::Neutral
        } else if self.bad.contains(&surface) {
            SurfaceClass::Bad
        } else {
            SurfaceClass::Unknown
        }
    }

    /// 1 for good, 0.5 for neutral, 0 for bad or unknown tags.
    pub fn tag_score(&self, surface: &str) -> f64 {
        self.classify(surface).score()
    }
}

impl SurfaceMatch {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 0.8 {
            SurfaceMatch::WellMatched
        } else if ratio > 0.4 {
            SurfaceMatch::ModeratelyMatched
        } else {
            SurfaceMatch::PoorlyMatched
        }
    }
}

/// Rates an already collected list of edge surface tags, `None` for untagged edges.
pub fn score_surfaces<'a, I>(surfaces: I, profile: BikeProfile) -> SurfaceScore
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    if profile == BikeProfile::None {
        return SurfaceScore::NotRequested;
    }

    let preferences = profile.surface_preferences();
    let mut tagged = 0usize;
    let mut unknown = 0usize;
    let mut score = 0.0;
    for surface in surfaces.into_iter().flatten() {
        let class = preferences.classify(surface);
        if class == SurfaceClass::Unknown {
            unknown += 1;
        }
        tagged += 1;
        score += class.score();
    }

    if tagged == 0 {
        return SurfaceScore::NoSurfaceData;
    }
    if unknown > 0 {
        debug!(
            "{} of {} tagged edges have a surface the {} profile does not list",
            unknown, tagged, profile
        );
    }

    let ratio = score / tagged as f64;
    SurfaceScore::Rated {
        ratio,
        rating: SurfaceMatch::from_ratio(ratio),
    }
}

/// How well the surfaces along `route` suit `profile`.
pub fn analyze_route_compatibility<G: RoadNetwork>(
    graph: &G,
    route: &[G::NodeId],
    profile: BikeProfile,
) -> SurfaceScore {
    let score = score_surfaces(
        route
            .windows(2)
            .map(|pair| graph.edge_surface(pair[0], pair[1])),
        profile,
    );
    debug!("Surface score for {} profile: {:?}", profile, score);
    score
}
