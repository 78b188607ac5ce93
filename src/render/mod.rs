pub(crate) mod blend;
pub(crate) mod blur;
pub(crate) mod canvas;
pub(crate) mod cpu;
pub(crate) mod fonts;
pub(crate) mod raster;
