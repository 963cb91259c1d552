pub mod gaps;

pub mod line;

pub mod sequence;

pub mod splitter;

pub mod stats;

pub mod synth;
