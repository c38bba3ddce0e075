use bevy::{prelude::*, transform::TransformSystems};
use tracing::warn;

use crate::{
    extractor::{DEFAULT_NORMAL_EPSILON, DEFAULT_RESOLUTION, SurfaceExtractor},
    field::{DEFAULT_MARGIN, MetaballField},
    mesh::SurfaceMesh,
    types::{Point, Value, point_from_vec3},
};

/// System sets for the metaball pipeline.
///
/// Use these to order your own systems relative to surface extraction:
///
/// ```rust,ignore
/// // Run after the surface is extracted but before it's uploaded, e.g. for collider generation:
/// app.add_systems(PostUpdate, build_collider.after(MetaballSet::Extract)
///                                       .before(MetaballSet::Upload));
/// ```
///
/// The sets run in `PostUpdate`, after transform propagation:
///
/// ```text
/// TransformSystems::Propagate  →  MetaballSet::Refresh  →  MetaballSet::Extract  →  [your systems]  →  MetaballSet::Upload
/// ```
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetaballSet {
    /// Snapshots ball positions into each surface's field.
    Refresh,
    /// Runs marching cubes over every refreshed field.
    Extract,
    /// Uploads the extracted buffers into a Bevy [`Mesh3d`].
    Upload,
}

/// Runtime configuration for the metaball pipeline.
///
/// Inserted as a resource by [`MetaballPlugin`]. Modify it at any time; changes apply on the next frame:
///
/// ```rust,ignore
/// app.add_plugins(MetaballPlugin { resolution: 48, ..default() });
///
/// // Or change it at runtime:
/// fn my_system(mut config: ResMut<MetaballConfig>) {
///     config.resolution = 16; // coarser surface while the camera is far away
/// }
/// ```
#[derive(Resource, Debug, Clone)]
pub struct MetaballConfig {
    /// Voxels along each axis of the extraction grid. Default: `30`.
    pub resolution: usize,
    /// Central-difference step for vertex normals. Default: `0.001`.
    pub normal_epsilon: Value,
    /// Padding added around each ball's radius when sizing the grid. Default: `0.1`.
    pub margin: Value,
}

impl Default for MetaballConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            normal_epsilon: DEFAULT_NORMAL_EPSILON,
            margin: DEFAULT_MARGIN,
        }
    }
}

/// A metaball surface driven by a set of ball entities.
///
/// Each frame the translations of `balls` become the field's sources and the
/// surface mesh is rebuilt from scratch. Ball positions are taken relative to
/// this entity's transform, so the mesh lines up with the balls wherever the
/// surface entity is placed.
#[derive(Component)]
#[require(Transform)]
pub struct MetaballSurface {
    /// Entities whose [`GlobalTransform`] translations are the ball centres.
    pub balls: Vec<Entity>,
    /// Radius shared by every ball.
    pub radius: Value,
    field: MetaballField,
    extractor: SurfaceExtractor,
    positions: Vec<Point>,
    ready: bool,
}

impl MetaballSurface {
    pub fn new(balls: Vec<Entity>, radius: Value) -> Self {
        Self {
            balls,
            radius,
            field: MetaballField::new(radius),
            extractor: SurfaceExtractor::default(),
            positions: Vec::new(),
            ready: false,
        }
    }

    /// The field snapshot used by the current frame.
    pub fn field(&self) -> &MetaballField {
        &self.field
    }

    /// The buffers produced by the last extraction.
    pub fn mesh(&self) -> &SurfaceMesh {
        self.extractor.mesh()
    }
}

/// Bevy plugin that re-extracts every [`MetaballSurface`] once per frame.
///
/// When the `auto_update` feature is enabled the pipeline runs in `PostUpdate`, once the
/// frame's `Transform` changes have reached `GlobalTransform`:
///
/// ```text
/// ball Transforms
///   → GlobalTransform propagated      (TransformSystems::Propagate)
///   → field refreshed                 (MetaballSet::Refresh)
///   → marching cubes over the grid    (MetaballSet::Extract)
///   → [your systems here]
///   → Mesh3d inserted                 (MetaballSet::Upload)
/// ```
pub struct MetaballPlugin {
    /// Initial value for [`MetaballConfig::resolution`].
    pub resolution: usize,
    /// Initial value for [`MetaballConfig::normal_epsilon`].
    pub normal_epsilon: Value,
    /// Initial value for [`MetaballConfig::margin`].
    pub margin: Value,
}

impl Default for MetaballPlugin {
    fn default() -> Self {
        let config = MetaballConfig::default();
        Self {
            resolution: config.resolution,
            normal_epsilon: config.normal_epsilon,
            margin: config.margin,
        }
    }
}

impl Plugin for MetaballPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(MetaballConfig {
            resolution: self.resolution,
            normal_epsilon: self.normal_epsilon,
            margin: self.margin,
        });

        #[cfg(feature = "auto_update")]
        app.configure_sets(
            PostUpdate,
            (
                MetaballSet::Refresh,
                MetaballSet::Extract,
                MetaballSet::Upload,
            )
                .chain()
                .after(TransformSystems::Propagate),
        )
        .add_systems(
            PostUpdate,
            (
                refresh_fields.in_set(MetaballSet::Refresh),
                extract_surfaces.in_set(MetaballSet::Extract),
                upload_meshes.in_set(MetaballSet::Upload),
            ),
        );
    }
}

/// Copies the current ball positions into each surface's field.
///
/// A surface whose balls can't all be found is skipped for the frame and keeps its last mesh.
pub fn refresh_fields(
    config: Res<MetaballConfig>,
    mut surfaces: Query<(Entity, &mut MetaballSurface, &GlobalTransform)>,
    balls: Query<&GlobalTransform, Without<MetaballSurface>>,
) {
    for (entity, mut surface, surface_transform) in surfaces.iter_mut() {
        let surface = &mut *surface;
        surface.ready = false;

        let to_local = surface_transform.affine().inverse();
        surface.positions.clear();
        for &ball in &surface.balls {
            let Ok(ball_transform) = balls.get(ball) else {
                warn!("metaball surface {entity} references missing ball {ball}");
                break;
            };
            let local = to_local.transform_point3(ball_transform.translation());
            surface.positions.push(point_from_vec3(local));
        }
        if surface.positions.len() != surface.balls.len() {
            continue;
        }

        surface.field.radius = surface.radius;
        surface.field.margin = config.margin;
        match surface.field.refresh(&surface.positions) {
            Ok(()) => surface.ready = true,
            Err(err) => warn!("skipping metaball surface {entity}: {err}"),
        }
    }
}

/// Rebuilds the mesh buffers of every refreshed surface.
pub fn extract_surfaces(config: Res<MetaballConfig>, mut surfaces: Query<(Entity, &mut MetaballSurface)>) {
    for (entity, mut surface) in surfaces.iter_mut() {
        let surface = &mut *surface;
        if !surface.ready {
            continue;
        }

        surface.extractor.resolution = config.resolution;
        surface.extractor.normal_epsilon = config.normal_epsilon;
        if let Err(err) = surface.extractor.extract_surface(&surface.field) {
            warn!("failed to extract metaball surface {entity}: {err}");
            surface.ready = false;
        }
    }
}

/// Uploads each freshly extracted surface into a Bevy [`Mesh3d`].
///
/// The previous frame's mesh asset is dropped along with the replaced handle.
pub fn upload_meshes(
    mut commands: Commands,
    surfaces: Query<(Entity, &MetaballSurface)>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    for (entity, surface) in surfaces.iter() {
        if !surface.ready {
            continue;
        }

        commands
            .entity(entity)
            .insert(Mesh3d(meshes.add(surface.mesh().to_bevy_mesh())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, MetaballPlugin { resolution: 12, ..default() }));
        app.init_resource::<Assets<Mesh>>();
        app
    }

    fn spawn_ball(app: &mut App, at: Vec3) -> Entity {
        app.world_mut()
            .spawn((Transform::from_translation(at), GlobalTransform::from_translation(at)))
            .id()
    }

    #[test]
    fn plugin_inserts_config() {
        let app = app();
        let config = app.world().resource::<MetaballConfig>();
        assert_eq!(config.resolution, 12);
        assert_eq!(config.margin, DEFAULT_MARGIN);
    }

    #[cfg(feature = "auto_update")]
    #[test]
    fn surface_gets_a_mesh_each_frame() {
        let mut app = app();
        let balls = vec![
            spawn_ball(&mut app, Vec3::new(-0.5, 0., 0.)),
            spawn_ball(&mut app, Vec3::new(0.5, 0., 0.)),
            spawn_ball(&mut app, Vec3::new(0., 0.5, 0.)),
        ];
        let surface = app
            .world_mut()
            .spawn((MetaballSurface::new(balls, 1.), GlobalTransform::IDENTITY))
            .id();

        app.update();

        let world = app.world();
        let surface_ref = world.get::<MetaballSurface>(surface).unwrap();
        assert_eq!(surface_ref.field().positions().len(), 3);
        assert!(!surface_ref.mesh().is_empty());

        let handle = world.get::<Mesh3d>(surface).unwrap();
        let mesh = world.resource::<Assets<Mesh>>().get(&handle.0).unwrap();
        assert_eq!(mesh.count_vertices(), surface_ref.mesh().vertex_count());
    }

    #[cfg(feature = "auto_update")]
    #[test]
    fn ball_moves_apply_in_the_same_frame() {
        let mut app = app();
        app.add_plugins(TransformPlugin);
        let ball = spawn_ball(&mut app, Vec3::ZERO);
        let surface = app
            .world_mut()
            .spawn((MetaballSurface::new(vec![ball], 1.), Transform::from_xyz(1., 0., 0.)))
            .id();
        app.update();

        app.world_mut().get_mut::<Transform>(ball).unwrap().translation = Vec3::new(3., 0., 0.);
        app.update();

        let surface_ref = app.world().get::<MetaballSurface>(surface).unwrap();
        // Relative to the surface entity, which sits at x = 1.
        assert_eq!(surface_ref.field().positions(), &[Point::new(2., 0., 0.)]);
        assert!(surface_ref.mesh().vertices.iter().all(|v| v[0] > 0.));
    }

    #[cfg(feature = "auto_update")]
    #[test]
    fn despawned_ball_skips_upload() {
        let mut app = app();
        let ball = spawn_ball(&mut app, Vec3::ZERO);
        let surface = app
            .world_mut()
            .spawn((MetaballSurface::new(vec![ball], 1.), GlobalTransform::IDENTITY))
            .id();

        app.world_mut().despawn(ball);
        app.update();

        assert!(app.world().get::<Mesh3d>(surface).is_none());
        assert!(!app.world().get::<MetaballSurface>(surface).unwrap().ready);
    }
}
