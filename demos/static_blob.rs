use bevy::{
    pbr::wireframe::{Wireframe, WireframeConfig},
    prelude::*,
};
use bevy_metaballs::{MetaballPlugin, MetaballSurface};

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            bevy::pbr::wireframe::WireframePlugin::default(),
            MetaballPlugin {
                resolution: 20,
                ..default()
            },
        ))
        .insert_resource(WireframeConfig {
            global: true,
            ..Default::default()
        })
        .add_systems(Startup, setup)
        .run();
}

fn setup(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(-3., 2.5, -3.).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let balls = [
        Vec3::new(-0.5, 0., 0.),
        Vec3::new(0.5, 0., 0.),
        Vec3::new(0., 0.5, 0.),
    ]
    .map(|at| commands.spawn(Transform::from_translation(at)).id());

    commands.spawn((MetaballSurface::new(balls.to_vec(), 1.), Wireframe));
}
