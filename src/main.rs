use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, error, info};

use transit_sim::simulation::{
    astar, dijkstra, max_flow, priority_dijkstra, EdgeId, Journey, JourneyUpdate, NodeId,
    SimEvent, StepStatus, TransitWorld, VehicleKind,
};

#[derive(Clone, Copy, ValueEnum)]
enum VehicleArg {
    Car,
    Bus,
    Truck,
}

impl From<VehicleArg> for VehicleKind {
    fn from(arg: VehicleArg) -> Self {
        match arg {
            VehicleArg::Car => VehicleKind::Car,
            VehicleArg::Bus => VehicleKind::Bus,
            VehicleArg::Truck => VehicleKind::Truck,
        }
    }
}

#[derive(Parser)]
#[command(name = "transit_sim")]
#[command(about = "Transport network routing and vehicle simulation")]
struct Cli {
    /// Starting stop
    #[arg(long, default_value = "0")]
    source: usize,

    /// Destination stop
    #[arg(long, default_value = "5")]
    destination: usize,

    /// Vehicle used for journey playback
    #[arg(long, value_enum, default_value = "bus")]
    vehicle: VehicleArg,

    /// Maximum number of simulation steps
    #[arg(long, default_value = "1000")]
    ticks: usize,

    /// Time delta per step
    #[arg(long, default_value = "0.1")]
    delta: f64,

    /// Weight multiplier for priority roads
    #[arg(long, default_value = "0.5")]
    reduction_factor: f64,

    /// Number of passengers waiting across the network
    #[arg(long, default_value = "12")]
    passengers: usize,

    /// Seed for passenger placement
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Edge to disturb before the final route recalculation
    #[arg(long)]
    disturb_edge: Option<usize>,

    /// Multiplier applied to the disturbed edge
    #[arg(long, default_value = "3.0")]
    congestion_factor: f64,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let source = NodeId(cli.source);
    let destination = NodeId(cli.destination);

    let mut world = TransitWorld::create_demo_world(cli.seed, cli.passengers)
        .context("Failed to build demo network")?;
    world
        .begin_journey(source, destination)
        .context("Invalid source or destination")?;

    print_network(&world);
    print_routes(&world, cli)?;
    play_back_journey(&world, cli)?;

    info!("=== SIMULATING PRINCIPAL VEHICLE ===");
    let report = world.run_until_settled(cli.delta, cli.ticks);
    let mut boarded = 0;
    let mut alighted = 0;
    for event in &report.events {
        match event {
            SimEvent::PassengerBoarded { .. } => boarded += 1,
            SimEvent::PassengerAlighted { .. } => alighted += 1,
            _ => {}
        }
        debug!("{:?}", event);
    }

    if let Some(edge) = cli.disturb_edge {
        let event = world
            .recalculate_route(source, destination, EdgeId(edge), cli.congestion_factor)
            .context("Route recalculation failed")?;
        if let SimEvent::RouteRecalculated { path, .. } = event {
            match path {
                Some(path) => println!("Recalculated route: {:?} (cost {})", ids(&path.nodes), path.cost),
                None => println!("Recalculated route: none"),
            }
        }
    }

    let principal = world.principal();
    let status = match report.final_status {
        Some(StepStatus::Arrived) => "arrived",
        Some(StepStatus::Halted) => "halted",
        Some(_) => "still travelling",
        None => "not started",
    };
    info!("=== SIMULATION COMPLETE ===");
    info!("Steps run: {}", report.steps);
    info!("Simulated time: {:.2}", world.time());
    info!("Final node: {}", principal.current);
    info!("Status: {}", status);
    info!("Passengers boarded: {}", boarded);
    info!("Passengers alighted: {}", alighted);
    info!("Passengers on board: {}", principal.occupancy());
    info!("Passengers still waiting: {}", world.manager().total_waiting());
    Ok(())
}

fn ids(nodes: &[NodeId]) -> Vec<usize> {
    nodes.iter().map(|n| n.0).collect()
}

fn print_network(world: &TransitWorld) {
    let network = world.network();
    let summary = network.summary();
    println!("=== Transport Network ===");
    println!(
        "Stops: {}, Routes: {}, Signals: {}, Strongly connected components: {}",
        summary.nodes, summary.edges, summary.signals, summary.strongly_connected_components
    );
    for node in network.nodes() {
        println!(
            "  Stop {}: '{}' ({}) at ({:.0}, {:.0})",
            node.id, node.name, node.category, node.position.x, node.position.y
        );
    }
    for (id, edge) in network.edges() {
        println!(
            "  Route {}: {} -> {}, distance {:.2}, priority {}, capacity {}",
            id, edge.source, edge.destination, edge.distance, edge.priority, edge.capacity
        );
    }
    println!();
}

fn print_routes(world: &TransitWorld, cli: &Cli) -> Result<()> {
    let network = world.network();
    let source = NodeId(cli.source);
    let destination = NodeId(cli.destination);

    match dijkstra(network, source, destination).context("Dijkstra failed")? {
        Some(path) => println!("Dijkstra: {:?} (cost {})", ids(&path.nodes), path.cost),
        None => println!("Dijkstra: no route from {} to {}", source, destination),
    }

    match priority_dijkstra(network, source, destination, cli.reduction_factor)
        .context("Priority Dijkstra failed")?
    {
        Some(path) => println!("Priority Dijkstra: {:?} (cost {})", ids(&path.nodes), path.cost),
        None => println!("Priority Dijkstra: no route from {} to {}", source, destination),
    }

    match astar(network, source, destination).context("A* failed")? {
        Some(path) => println!("A*: {:?} (cost {:.2})", ids(&path.nodes), path.cost),
        None => println!("A*: no route from {} to {}", source, destination),
    }

    let flow = max_flow(network, source, destination).context("Max flow failed")?;
    println!("Max flow {} -> {}: {}", source, destination, flow.value);
    println!();
    Ok(())
}

fn play_back_journey(world: &TransitWorld, cli: &Cli) -> Result<()> {
    let network = world.network();
    let kind = VehicleKind::from(cli.vehicle);
    let Some(mut journey) = Journey::plan(
        network,
        NodeId(cli.source),
        NodeId(cli.destination),
        kind,
        world.config().journey.clone(),
    )
    .context("Journey planning failed")?
    else {
        println!("Journey: no route");
        return Ok(());
    };

    println!(
        "Journey ({}): base duration {:.2}",
        kind,
        journey.base_duration(network)
    );
    for _ in 0..cli.ticks {
        match journey.advance(network, cli.delta) {
            JourneyUpdate::ReachedNode { node, pause } => {
                debug!("{} reached stop {} (pause: {:?})", kind, node, pause);
            }
            JourneyUpdate::Finished { total_time } => {
                println!("Journey finished in {:.2} including pauses", total_time);
                break;
            }
            _ => {}
        }
    }
    println!();
    Ok(())
}
