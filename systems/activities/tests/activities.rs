use skirmish_core::{
    ActorId, Bounds, CaptureNotice, CellCoord, CellRectSize, Color, Command, Event, PlayerId,
    RejectionReason, TileId,
};
use skirmish_system_activities::{
    Activities, Activity, ActivityResult, CaptureBuilding, EnterTransport, Wait,
};
use skirmish_world::{query, ActorInit, EjectPassengersOnCapture, Map, Player, Ruleset, World};

const RED: PlayerId = PlayerId::new(1);
const BLUE: PlayerId = PlayerId::new(2);

fn world() -> World {
    let map = Map::new("temperat", 16, 16, Bounds::new(0, 0, 16, 16), TileId::new(0, 0))
        .expect("valid map");
    let mut world = World::new(map, Ruleset::new(), RED);
    world.add_player(Player::new(RED, "red", Color::from_rgb(0xff, 0, 0)));
    world.add_player(Player::new(BLUE, "blue", Color::from_rgb(0, 0, 0xff)));
    world
}

fn building(world: &mut World, owner: PlayerId, origin: CellCoord) -> ActorId {
    world.spawn(ActorInit::new("fact", owner, origin).with_footprint(CellRectSize::new(2, 2)))
}

fn engineer(world: &mut World, owner: PlayerId, location: CellCoord) -> ActorId {
    world.spawn(ActorInit::new("e6", owner, location))
}

fn transport(world: &mut World, owner: PlayerId, location: CellCoord, capacity: u32) -> ActorId {
    world.spawn(
        ActorInit::new("apc", owner, location)
            .with_footprint(CellRectSize::new(1, 1))
            .with_cargo(capacity)
            .with_capture_notifier(Box::new(EjectPassengersOnCapture)),
    )
}

fn run(activities: &mut Activities, world: &mut World) -> Vec<Event> {
    let mut events = Vec::new();
    activities.run_frame(world, &mut events);
    events
}

#[test]
fn capture_transfers_ownership_and_consumes_engineer() {
    let mut world = world();
    let target = building(&mut world, BLUE, CellCoord::new(4, 4));
    let capturer = engineer(&mut world, RED, CellCoord::new(5, 5));
    let mut activities = Activities::new();
    activities.queue(capturer, Box::new(CaptureBuilding::new(target)));

    let events = run(&mut activities, &mut world);

    assert_eq!(
        events,
        vec![
            Event::OwnerChanged {
                actor: target,
                old_owner: BLUE,
                new_owner: RED,
            },
            Event::ActorCaptured(CaptureNotice {
                target,
                capturer,
                old_owner: BLUE,
                new_owner: RED,
            }),
            Event::ActorDestroyed { actor: capturer },
        ]
    );
    assert_eq!(query::actor(&world, target).map(|actor| actor.owner()), Some(RED));
    assert!(!query::is_alive(&world, capturer));

    let events = run(&mut activities, &mut world);
    assert!(events.is_empty());
    assert!(activities.is_idle(capturer));
}

#[test]
fn capture_outside_footprint_finishes_without_command() {
    let mut world = world();
    let target = building(&mut world, BLUE, CellCoord::new(4, 4));
    let capturer = engineer(&mut world, RED, CellCoord::new(6, 4));
    let mut activities = Activities::new();
    activities.queue(capturer, Box::new(CaptureBuilding::new(target)));

    let events = run(&mut activities, &mut world);

    assert!(events.is_empty());
    assert!(activities.is_idle(capturer));
    assert_eq!(query::actor(&world, target).map(|actor| actor.owner()), Some(BLUE));
    assert!(query::is_alive(&world, capturer));
}

#[test]
fn capture_of_own_building_is_skipped() {
    let mut world = world();
    let target = building(&mut world, RED, CellCoord::new(4, 4));
    let capturer = engineer(&mut world, RED, CellCoord::new(4, 4));
    let mut activities = Activities::new();
    activities.queue(capturer, Box::new(CaptureBuilding::new(target)));

    assert!(run(&mut activities, &mut world).is_empty());
    assert!(activities.is_idle(capturer));
    assert!(query::is_alive(&world, capturer));
}

#[test]
fn capture_of_unknown_target_is_skipped() {
    let mut world = world();
    let capturer = engineer(&mut world, RED, CellCoord::new(4, 4));
    let mut activities = Activities::new();
    activities.queue(capturer, Box::new(CaptureBuilding::new(ActorId::new(99))));

    assert!(run(&mut activities, &mut world).is_empty());
    assert!(activities.is_idle(capturer));
}

#[test]
fn canceled_capture_schedules_nothing() {
    let mut world = world();
    let target = building(&mut world, BLUE, CellCoord::new(4, 4));
    let capturer = engineer(&mut world, RED, CellCoord::new(4, 4));
    let mut activities = Activities::new();
    activities.queue(capturer, Box::new(CaptureBuilding::new(target)));
    assert!(activities.cancel(capturer));

    assert!(run(&mut activities, &mut world).is_empty());
    assert!(activities.is_idle(capturer));
    assert_eq!(query::actor(&world, target).map(|actor| actor.owner()), Some(BLUE));
}

#[test]
fn cancel_on_idle_actor_reports_false() {
    let mut world = world();
    let capturer = engineer(&mut world, RED, CellCoord::new(4, 4));
    let mut activities = Activities::new();

    assert!(!activities.cancel(capturer));
    assert!(activities.is_idle(capturer));
}

#[test]
fn simultaneous_captures_only_consume_first_engineer() {
    let mut world = world();
    let target = building(&mut world, BLUE, CellCoord::new(4, 4));
    let first = engineer(&mut world, RED, CellCoord::new(4, 4));
    let second = engineer(&mut world, RED, CellCoord::new(5, 5));
    let mut activities = Activities::new();
    activities.queue(first, Box::new(CaptureBuilding::new(target)));
    activities.queue(second, Box::new(CaptureBuilding::new(target)));

    let events = run(&mut activities, &mut world);

    assert!(!query::is_alive(&world, first));
    assert!(query::is_alive(&world, second));
    assert_eq!(
        events.last(),
        Some(&Event::CommandRejected {
            command: Command::CaptureActor {
                target,
                capturer: second,
            },
            reason: RejectionReason::AlreadyOwned,
        })
    );

    // The survivor sees the new owner at its next tick and stands down.
    assert!(run(&mut activities, &mut world).is_empty());
    assert!(activities.is_idle(second));
}

#[test]
fn enter_transport_stows_adjacent_passenger() {
    let mut world = world();
    let apc = transport(&mut world, RED, CellCoord::new(6, 6), 2);
    let passenger = engineer(&mut world, RED, CellCoord::new(7, 7));
    let mut activities = Activities::new();
    activities.queue(passenger, Box::new(EnterTransport::new(apc)));

    let events = run(&mut activities, &mut world);

    assert_eq!(
        events,
        vec![
            Event::ActorRemoved { actor: passenger },
            Event::CargoLoaded {
                transport: apc,
                passenger,
            },
        ]
    );
    assert!(!query::is_in_world(&world, passenger));
    assert!(query::is_alive(&world, passenger));
    assert_eq!(query::carrier_of(&world, passenger), Some(apc));
    assert!(query::actors_at(&world, CellCoord::new(7, 7)).is_empty());
    assert_eq!(activities.current(passenger), Some("EnterTransport"));
}

#[test]
fn enter_transport_out_of_reach_does_nothing() {
    let mut world = world();
    let apc = transport(&mut world, RED, CellCoord::new(6, 6), 2);
    let passenger = engineer(&mut world, RED, CellCoord::new(8, 6));
    let mut activities = Activities::new();
    activities.queue(passenger, Box::new(EnterTransport::new(apc)));

    assert!(run(&mut activities, &mut world).is_empty());
    assert!(activities.is_idle(passenger));
    assert!(query::is_in_world(&world, passenger));
    assert_eq!(query::carrier_of(&world, passenger), None);
}

#[test]
fn enter_full_transport_does_nothing() {
    let mut world = world();
    let apc = transport(&mut world, RED, CellCoord::new(6, 6), 1);
    let first = engineer(&mut world, RED, CellCoord::new(5, 6));
    let second = engineer(&mut world, RED, CellCoord::new(7, 6));
    let mut activities = Activities::new();
    activities.queue(first, Box::new(EnterTransport::new(apc)));
    activities.queue(second, Box::new(EnterTransport::new(apc)));

    let _ = run(&mut activities, &mut world);

    assert!(!query::is_in_world(&world, first));
    assert!(query::is_in_world(&world, second));
    assert!(activities.is_idle(second));
    assert_eq!(
        query::actor(&world, apc)
            .and_then(|actor| actor.cargo())
            .map(|cargo| cargo.passengers().to_vec()),
        Some(vec![first])
    );
}

fn cargo_of(world: &World, transport: ActorId) -> Option<Vec<ActorId>> {
    query::actor(world, transport)
        .and_then(|actor| actor.cargo())
        .map(|cargo| cargo.passengers().to_vec())
}

#[test]
fn passenger_destroyed_while_boarding_frees_its_slot() {
    let mut world = world();
    let apc = transport(&mut world, RED, CellCoord::new(6, 6), 1);
    let doomed = engineer(&mut world, RED, CellCoord::new(5, 6));
    let later = engineer(&mut world, RED, CellCoord::new(7, 6));
    let mut activities = Activities::new();
    world.schedule(Command::DestroyActor { actor: doomed });
    activities.queue(doomed, Box::new(EnterTransport::new(apc)));

    let events = run(&mut activities, &mut world);

    assert_eq!(
        events,
        vec![
            Event::ActorDestroyed { actor: doomed },
            Event::CommandRejected {
                command: Command::RemoveActor { actor: doomed },
                reason: RejectionReason::ActorDead,
            },
        ]
    );
    assert_eq!(query::carrier_of(&world, doomed), None);
    assert_eq!(cargo_of(&world, apc), Some(vec![]));

    activities.queue(later, Box::new(EnterTransport::new(apc)));
    let _ = run(&mut activities, &mut world);

    assert!(!query::is_in_world(&world, later));
    assert_eq!(cargo_of(&world, apc), Some(vec![later]));
}

#[test]
fn destroying_carried_passenger_empties_its_slot() {
    let mut world = world();
    let apc = transport(&mut world, RED, CellCoord::new(6, 6), 1);
    let passenger = engineer(&mut world, RED, CellCoord::new(6, 7));
    let mut activities = Activities::new();
    activities.queue(passenger, Box::new(EnterTransport::new(apc)));
    let _ = run(&mut activities, &mut world);
    assert_eq!(query::carrier_of(&world, passenger), Some(apc));

    world.schedule(Command::DestroyActor { actor: passenger });
    let events = run(&mut activities, &mut world);

    assert_eq!(events, vec![Event::ActorDestroyed { actor: passenger }]);
    assert_eq!(query::carrier_of(&world, passenger), None);
    assert_eq!(cargo_of(&world, apc), Some(vec![]));
    let _ = run(&mut activities, &mut world);
    assert!(activities.is_idle(passenger));
}

#[test]
fn enter_transport_without_cargo_bay_does_nothing() {
    let mut world = world();
    let truck = engineer(&mut world, RED, CellCoord::new(6, 6));
    let passenger = engineer(&mut world, RED, CellCoord::new(6, 7));
    let mut activities = Activities::new();
    activities.queue(passenger, Box::new(EnterTransport::new(truck)));

    assert!(run(&mut activities, &mut world).is_empty());
    assert!(activities.is_idle(passenger));
}

#[test]
fn captured_transport_ejects_passengers_on_following_frame() {
    let mut world = world();
    let apc = transport(&mut world, BLUE, CellCoord::new(6, 6), 2);
    let passenger = engineer(&mut world, BLUE, CellCoord::new(6, 7));
    let capturer = engineer(&mut world, RED, CellCoord::new(6, 6));
    let mut activities = Activities::new();
    activities.queue(passenger, Box::new(EnterTransport::new(apc)));
    activities.queue(passenger, Box::new(Wait::new(3)));

    let _ = run(&mut activities, &mut world);
    assert!(!query::is_in_world(&world, passenger));

    activities.queue(capturer, Box::new(CaptureBuilding::new(apc)));
    let events = run(&mut activities, &mut world);
    assert!(events.contains(&Event::OwnerChanged {
        actor: apc,
        old_owner: BLUE,
        new_owner: RED,
    }));
    assert_eq!(
        query::pending_commands(&world),
        &[Command::UnloadCargo { transport: apc }]
    );
    // Carried passengers keep their chain paused.
    assert_eq!(activities.current(passenger), Some("EnterTransport"));

    let events = run(&mut activities, &mut world);
    assert!(events.contains(&Event::CargoUnloaded {
        transport: apc,
        passenger,
    }));
    assert!(query::is_in_world(&world, passenger));
    assert_eq!(
        query::actor(&world, passenger).map(|actor| actor.location()),
        Some(CellCoord::new(6, 6))
    );

    let _ = run(&mut activities, &mut world);
    assert_eq!(activities.current(passenger), Some("Wait"));
}

#[test]
fn commands_from_one_frame_apply_in_actor_tick_order() {
    let mut world = world();
    let north = building(&mut world, BLUE, CellCoord::new(0, 0));
    let middle = building(&mut world, BLUE, CellCoord::new(4, 0));
    let south = building(&mut world, BLUE, CellCoord::new(8, 0));
    let first = engineer(&mut world, RED, CellCoord::new(0, 0));
    let second = engineer(&mut world, RED, CellCoord::new(4, 0));
    let third = engineer(&mut world, RED, CellCoord::new(8, 0));
    let mut activities = Activities::new();
    activities.queue(third, Box::new(CaptureBuilding::new(south)));
    activities.queue(first, Box::new(CaptureBuilding::new(north)));
    activities.queue(second, Box::new(CaptureBuilding::new(middle)));

    let events = run(&mut activities, &mut world);

    let captures: Vec<(ActorId, ActorId)> = events
        .iter()
        .filter_map(|event| match event {
            Event::ActorCaptured(notice) => Some((notice.capturer, notice.target)),
            _ => None,
        })
        .collect();
    assert_eq!(
        captures,
        vec![(first, north), (second, middle), (third, south)]
    );
    let destroyed: Vec<ActorId> = events
        .iter()
        .filter_map(|event| match event {
            Event::ActorDestroyed { actor } => Some(*actor),
            _ => None,
        })
        .collect();
    assert_eq!(destroyed, vec![first, second, third]);
}

#[test]
fn wait_hands_over_after_its_frames() {
    let mut world = world();
    let actor = engineer(&mut world, RED, CellCoord::new(0, 0));
    let mut activities = Activities::new();
    activities.queue(actor, Box::new(Wait::new(2)));

    let _ = run(&mut activities, &mut world);
    let _ = run(&mut activities, &mut world);
    assert_eq!(activities.current(actor), Some("Wait"));
    let _ = run(&mut activities, &mut world);
    assert!(activities.is_idle(actor));
}

#[test]
fn queued_activities_run_in_order() {
    let mut world = world();
    let target = building(&mut world, BLUE, CellCoord::new(4, 4));
    let capturer = engineer(&mut world, RED, CellCoord::new(4, 5));
    let mut activities = Activities::new();
    activities.queue(capturer, Box::new(Wait::new(1)));
    activities.queue(capturer, Box::new(CaptureBuilding::new(target)));

    assert!(run(&mut activities, &mut world).is_empty());
    assert_eq!(activities.current(capturer), Some("Wait"));
    assert!(run(&mut activities, &mut world).is_empty());
    assert_eq!(activities.current(capturer), Some("CaptureBuilding"));

    let events = run(&mut activities, &mut world);
    assert!(events.contains(&Event::ActorDestroyed { actor: capturer }));
}

#[test]
fn chains_of_destroyed_actors_are_dropped() {
    let mut world = world();
    let actor = engineer(&mut world, RED, CellCoord::new(0, 0));
    let mut activities = Activities::new();
    activities.queue(actor, Box::new(Wait::new(10)));
    world.schedule(Command::DestroyActor { actor });

    let _ = run(&mut activities, &mut world);
    assert_eq!(activities.busy_count(), 1);
    let _ = run(&mut activities, &mut world);
    assert_eq!(activities.busy_count(), 0);
}

#[derive(Debug, Default)]
struct Abort;

impl Activity for Abort {
    fn name(&self) -> &'static str {
        "Abort"
    }

    fn tick(&mut self, _actor: ActorId, _world: &mut World) -> ActivityResult {
        ActivityResult::Terminate
    }

    fn cancel(&mut self) {}

    fn is_canceled(&self) -> bool {
        false
    }

    fn queue(&mut self, _next: Box<dyn Activity>) {}
}

#[test]
fn terminate_discards_successors() {
    let mut world = world();
    let actor = engineer(&mut world, RED, CellCoord::new(0, 0));
    let mut activities = Activities::new();
    activities.queue(actor, Box::new(Abort));
    activities.queue(actor, Box::new(Wait::new(5)));

    let _ = run(&mut activities, &mut world);
    assert!(activities.is_idle(actor));
}

#[test]
fn activities_observe_frame_start_state() {
    let mut world = world();
    let target = building(&mut world, BLUE, CellCoord::new(4, 4));
    let capturer = engineer(&mut world, RED, CellCoord::new(4, 4));
    let mut activities = Activities::new();
    activities.queue(capturer, Box::new(CaptureBuilding::new(target)));

    let mut events = Vec::new();
    let mut direct = CaptureBuilding::new(target);
    let result = direct.tick(capturer, &mut world);
    assert!(matches!(result, ActivityResult::Continue));
    assert_eq!(query::pending_commands(&world).len(), 1);
    assert_eq!(query::actor(&world, target).map(|actor| actor.owner()), Some(BLUE));

    activities.run_frame(&mut world, &mut events);
    assert_eq!(query::actor(&world, target).map(|actor| actor.owner()), Some(RED));
    assert!(query::pending_commands(&world).is_empty());
}
