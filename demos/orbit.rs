use bevy::prelude::*;
use bevy_metaballs::{MetaballPlugin, MetaballSurface};
use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraPlugin};

/// Drives a ball around a circle.
#[derive(Component)]
struct Orbit {
    radius: f32,
    speed: f32,
    phase: f32,
    tilt: f32,
}

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            MetaballPlugin::default(),
            PanOrbitCameraPlugin,
        ))
        .add_systems(Startup, setup)
        .add_systems(Update, (move_balls, debug))
        .run();
}

fn setup(
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Camera3d::default(),
        PanOrbitCamera {
            button_orbit: MouseButton::Right,
            button_pan: MouseButton::Middle,
            ..default()
        },
        Transform::from_xyz(4., 3., 4.).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: light_consts::lux::FULL_DAYLIGHT,
            ..Default::default()
        },
        Transform::default().with_rotation(Quat::from_rotation_x(-45.0_f32.to_radians())),
    ));

    let balls: Vec<Entity> = [
        (0.9, 1.0, 0.0, 0.0),
        (1.1, -0.7, 2.1, 0.4),
        (0.6, 1.6, 4.2, -0.6),
    ]
    .into_iter()
    .map(|(radius, speed, phase, tilt)| {
        commands
            .spawn((
                Transform::default(),
                Orbit {
                    radius,
                    speed,
                    phase,
                    tilt,
                },
            ))
            .id()
    })
    .collect();

    commands.spawn((
        MetaballSurface::new(balls, 0.6),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.2, 0.6, 1.),
            perceptual_roughness: 0.3,
            ..Default::default()
        })),
    ));
}

fn move_balls(time: Res<Time>, mut query: Query<(&Orbit, &mut Transform)>) {
    let t = time.elapsed_secs();
    for (orbit, mut transform) in query.iter_mut() {
        let angle = orbit.phase + orbit.speed * t;
        transform.translation = Vec3::new(
            orbit.radius * angle.cos(),
            orbit.tilt * angle.sin(),
            orbit.radius * angle.sin(),
        );
    }
}

fn debug(mut gizmos: Gizmos, query: Query<&GlobalTransform, With<Orbit>>) {
    for transform in query.iter() {
        gizmos.sphere(
            Isometry3d::from_translation(transform.translation()),
            0.05,
            Color::WHITE,
        );
    }
}
