use std::sync::Arc;

use crate::adapters::{AeneasAligner, CueMixConfig, FfmpegEngine, LibavProbe};
use crate::app::recompose_interactor::RecomposeInteractor;
use crate::error::CueMixResult;

/// Production engine: libav probing, ffmpeg CLI encoding
pub type DefaultEngine = FfmpegEngine<LibavProbe>;

/// Wires the production adapters into the interactors
pub struct DefaultAppContainer {
    aligner: Arc<AeneasAligner>,
    recompose_interactor: Arc<RecomposeInteractor<DefaultEngine, AeneasAligner>>,
}

impl DefaultAppContainer {
    pub fn new(config: CueMixConfig) -> CueMixResult<Self> {
        config.validate()?;

        let probe = LibavProbe::new()?;
        let engine = Arc::new(FfmpegEngine::new(
            probe,
            config.render.ffmpeg_binary.clone(),
        ));
        let aligner = Arc::new(AeneasAligner::new(
            config.alignment.python.clone(),
            config.alignment.language.clone(),
        ));

        let recompose_interactor = Arc::new(RecomposeInteractor::new(
            Arc::clone(&engine),
            Arc::clone(&aligner),
            config,
        ));

        Ok(Self {
            aligner,
            recompose_interactor,
        })
    }

    pub fn aligner(&self) -> Arc<AeneasAligner> {
        Arc::clone(&self.aligner)
    }

    pub fn recompose_interactor(&self) -> Arc<RecomposeInteractor<DefaultEngine, AeneasAligner>> {
        Arc::clone(&self.recompose_interactor)
    }
}
