//! Named (feed, kill) parameter regimes.

/// A feed/kill pair with the pattern regime it produces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub feed: f32,
    pub kill: f32,
}

/// Preset table, selectable by index. Pure data.
pub const PRESETS: &[Preset] = &[
    Preset {
        name: "Default",
        feed: 0.037,
        kill: 0.06,
    },
    Preset {
        name: "Solitons",
        feed: 0.03,
        kill: 0.062,
    },
    Preset {
        name: "Pulsating solitons",
        feed: 0.025,
        kill: 0.06,
    },
    Preset {
        name: "Worms",
        feed: 0.078,
        kill: 0.061,
    },
    Preset {
        name: "Mazes",
        feed: 0.029,
        kill: 0.057,
    },
    Preset {
        name: "Holes",
        feed: 0.039,
        kill: 0.058,
    },
    Preset {
        name: "Chaos",
        feed: 0.026,
        kill: 0.051,
    },
    Preset {
        name: "Chaos and holes",
        feed: 0.034,
        kill: 0.056,
    },
    Preset {
        name: "Moving spots",
        feed: 0.014,
        kill: 0.054,
    },
    Preset {
        name: "Spots and loops",
        feed: 0.018,
        kill: 0.051,
    },
    Preset {
        name: "Waves",
        feed: 0.014,
        kill: 0.045,
    },
    Preset {
        name: "The U-Skate World",
        feed: 0.062,
        kill: 0.06093,
    },
];

/// Look up a preset by index.
pub fn preset(index: usize) -> Option<&'static Preset> {
    PRESETS.get(index)
}
