//! Material Resolver
//!
//! Two hooks around the host's glTF import:
//!
//! | Hook | Runs | Does |
//! |------|------|------|
//! | [`MaterialResolver::pre_pass`]  | before images load | re-points brush material texture refs at the brush's own files |
//! | [`MaterialResolver::post_pass`] | after meshes exist | resolve, acquire, remap, assign; one [`MeshTask`] per mesh |
//!
//! Both hooks return `None` and touch nothing unless the document declares
//! a brush-material extension marker. Per-mesh failures are logged and the
//! mesh keeps its default material; [`MaterialResolver::complete`] always
//! finishes with an [`ImportReport`].

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use std::sync::Arc;
use std::time::Duration;

use crate::adapter::AttributeAdapter;
use crate::assets::{AssetReader, AssetReaderVariant};
use crate::brush::{BrushRegistry, CanonicalBrushKey, MaterialParameterTable, TextureSlot};
use crate::config::LoaderConfig;
use crate::document::SceneDocument;
use crate::errors::{Error, Result};
use crate::frame_sync::FrameClock;
use crate::material::{BrushMaterial, MaterialAssignment};
use crate::program::{ProgramCompiler, ShaderProgramCache};
use crate::scene::{ImportedMesh, ImportedScene};

/// Pending resolution of one mesh. Await them together with
/// [`MaterialResolver::complete`].
pub type MeshTask<'a> = BoxFuture<'a, MeshOutcome>;

/// How one mesh's material resolution ended.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshOutcome {
    /// Brush material assigned.
    Resolved(CanonicalBrushKey),
    /// The primitive references no material.
    NoMaterial,
    /// No identifier of the material matched a brush.
    Unresolved(Error),
    /// The brush resolved but has no definition.
    MissingDefinition(CanonicalBrushKey),
    /// Program load or attribute adaptation failed.
    Failed(CanonicalBrushKey, Error),
}

/// Summary of a post-pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub resolved: usize,
    pub no_material: usize,
    pub unresolved: usize,
    pub missing_definition: usize,
    pub failed: usize,
    /// The part of `failed` caused by shader or texture loading, as opposed
    /// to meshes missing a required vertex channel.
    pub asset_failures: usize,
    /// One entry per mesh, in scene order.
    pub outcomes: Vec<MeshOutcome>,
}

impl ImportReport {
    #[must_use]
    pub fn from_outcomes(outcomes: Vec<MeshOutcome>) -> Self {
        let mut report = Self::default();
        for outcome in &outcomes {
            match outcome {
                MeshOutcome::Resolved(_) => report.resolved += 1,
                MeshOutcome::NoMaterial => report.no_material += 1,
                MeshOutcome::Unresolved(_) => report.unresolved += 1,
                MeshOutcome::MissingDefinition(_) => report.missing_definition += 1,
                MeshOutcome::Failed(_, err) => {
                    report.failed += 1;
                    if err.is_asset_failure() {
                        report.asset_failures += 1;
                    }
                }
            }
        }
        report.outcomes = outcomes;
        report
    }

    /// `true` when every mesh with a material got its brush.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unresolved == 0 && self.missing_definition == 0 && self.failed == 0
    }
}

/// Summary of a pre-pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrePassReport {
    /// Materials that resolved to a defined brush.
    pub resolved: usize,
    pub unresolved: usize,
    pub missing_definition: usize,
    /// Texture references re-pointed at brush files.
    pub retargeted: usize,
}

/// Import hook owning the program cache and frame clock of one loader.
pub struct MaterialResolver<R: AssetReader = AssetReaderVariant> {
    config: LoaderConfig,
    registry: Arc<BrushRegistry>,
    table: Arc<MaterialParameterTable>,
    cache: ShaderProgramCache<R>,
    adapter: AttributeAdapter,
    clock: FrameClock,
}

impl<R: AssetReader> MaterialResolver<R> {
    /// Resolver over the built-in brush registry and parameter table.
    pub fn new(reader: R, config: LoaderConfig) -> Self {
        Self::with_tables(
            reader,
            config,
            BrushRegistry::builtin(),
            MaterialParameterTable::builtin(),
        )
    }

    /// Resolver over caller-supplied brush content.
    pub fn with_tables(
        reader: R,
        config: LoaderConfig,
        registry: Arc<BrushRegistry>,
        table: Arc<MaterialParameterTable>,
    ) -> Self {
        let cache = ShaderProgramCache::new(reader, Arc::clone(&table), &config);
        Self {
            config,
            registry,
            table,
            cache,
            adapter: AttributeAdapter::new(),
            clock: FrameClock::new(),
        }
    }

    #[must_use]
    pub fn with_compiler(mut self, compiler: Arc<dyn ProgramCompiler>) -> Self {
        self.cache = self.cache.with_compiler(compiler);
        self
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &BrushRegistry {
        &self.registry
    }

    #[inline]
    #[must_use]
    pub fn table(&self) -> &MaterialParameterTable {
        &self.table
    }

    #[inline]
    #[must_use]
    pub fn cache(&self) -> &ShaderProgramCache<R> {
        &self.cache
    }

    /// Time since this resolver was created; feed it to
    /// [`FrameState::elapsed`](crate::frame_sync::FrameState::elapsed).
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    /// Standalone identifier query.
    pub fn resolve_identifier(&self, identifier: &str) -> Result<CanonicalBrushKey> {
        self.registry.resolve(identifier)
    }

    /// `true` if the document declares a brush-material extension marker.
    #[must_use]
    pub fn is_target(&self, document: &SceneDocument) -> bool {
        document.uses_extension(&self.config.extension_markers)
    }

    // ========================================================================
    // Pre-pass
    // ========================================================================

    /// Re-points texture references of brush materials at the brush's own
    /// image files under the configured base path.
    ///
    /// Returns `None` (document untouched) if the document is not a brush
    /// document.
    pub fn pre_pass(&self, document: &mut SceneDocument) -> Option<PrePassReport> {
        if !self.is_target(document) {
            log::debug!("Pre-pass skipped: no brush extension marker");
            return None;
        }

        let mut report = PrePassReport::default();
        let markers = &self.config.extension_markers;

        for index in 0..document.material_count() {
            let identifiers = document.material_identifiers(index, markers);
            let key = match self
                .registry
                .resolve_any(identifiers.iter().map(String::as_str))
            {
                Ok(key) => key,
                Err(err) => {
                    log::debug!("Pre-pass: material {index}: {err}");
                    report.unresolved += 1;
                    continue;
                }
            };
            let Some(definition) = self.table.lookup(key.as_str()) else {
                report.missing_definition += 1;
                continue;
            };

            report.resolved += 1;
            for slot in [TextureSlot::Main, TextureSlot::Bump] {
                let Some(uri) = definition.texture_path(&self.config.base_path, slot) else {
                    continue;
                };
                match document.retarget_material_texture(index, slot, &uri) {
                    Ok(true) => report.retargeted += 1,
                    Ok(false) => {}
                    Err(err) => log::warn!("Pre-pass: material {index} ({key}): {err}"),
                }
            }
        }

        log::debug!("Pre-pass: {report:?}");
        Some(report)
    }

    // ========================================================================
    // Post-pass
    // ========================================================================

    /// Starts material resolution for every mesh of `scene`.
    ///
    /// Returns `None` (scene untouched) if the document is not a brush
    /// document. The tasks borrow their mesh mutably and may be awaited in
    /// any order or interleaved.
    pub fn post_pass<'a>(
        &'a self,
        document: &SceneDocument,
        scene: &'a mut ImportedScene,
    ) -> Option<Vec<MeshTask<'a>>> {
        if !self.is_target(document) {
            log::debug!("Post-pass skipped: no brush extension marker");
            return None;
        }

        let markers = &self.config.extension_markers;
        let tasks = scene
            .meshes
            .iter_mut()
            .map(|mesh| {
                let identifiers = mesh
                    .material_index
                    .map(|index| document.material_identifiers(index, markers));
                self.resolve_mesh(mesh, identifiers).boxed()
            })
            .collect();

        Some(tasks)
    }

    /// Awaits every task and summarizes. Never fails.
    pub async fn complete(&self, tasks: Vec<MeshTask<'_>>) -> ImportReport {
        let report = ImportReport::from_outcomes(join_all(tasks).await);
        log::info!(
            "Brush import: {} resolved, {} unresolved, {} undefined, {} failed ({} asset loads), {} without material",
            report.resolved,
            report.unresolved,
            report.missing_definition,
            report.failed,
            report.asset_failures,
            report.no_material
        );
        report
    }

    /// Runs the post-pass and waits for it.
    pub async fn import(
        &self,
        document: &SceneDocument,
        scene: &mut ImportedScene,
    ) -> Option<ImportReport> {
        let tasks = self.post_pass(document, scene)?;
        Some(self.complete(tasks).await)
    }

    async fn resolve_mesh(
        &self,
        mesh: &mut ImportedMesh,
        identifiers: Option<Vec<String>>,
    ) -> MeshOutcome {
        let Some(identifiers) = identifiers else {
            return MeshOutcome::NoMaterial;
        };

        let key = match self
            .registry
            .resolve_any(identifiers.iter().map(String::as_str))
        {
            Ok(key) => key,
            Err(err) => {
                log::warn!("Mesh {}: {err}; keeping default material", mesh.name);
                return MeshOutcome::Unresolved(err);
            }
        };

        let Some(definition) = self.table.lookup(key.as_str()) else {
            log::warn!(
                "Mesh {}: brush {key} has no definition; keeping default material",
                mesh.name
            );
            return MeshOutcome::MissingDefinition(key);
        };

        let program = match self.cache.acquire(&key).await {
            Ok(program) => program,
            Err(err) => {
                log::warn!("Mesh {}: {err}; keeping default material", mesh.name);
                return MeshOutcome::Failed(key, err);
            }
        };

        if let Err(err) = self.adapter.remap(&mut mesh.attributes, &definition) {
            log::warn!("Mesh {} ({key}): {err}; keeping default material", mesh.name);
            return MeshOutcome::Failed(key, err);
        }

        mesh.material = MaterialAssignment::Brush(Box::new(BrushMaterial::new(program)));
        MeshOutcome::Resolved(key)
    }
}
