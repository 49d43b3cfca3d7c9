pub mod archive;
pub mod kicad;
pub mod kicad_sexpr;
pub mod snapshot;
