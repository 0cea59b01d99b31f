use remi_client::Stub;
use remi_common::{Fault, InterfaceDescriptor};
use remi_server::{Dispatcher, Outcome, Skeleton};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let descriptor = InterfaceDescriptor::new("pingpong.PingServer").method(
        "ping",
        &["i32"],
        "String",
        &[Fault::TRANSPORT_KIND],
    );
    let dispatcher = Dispatcher::new().register("ping", &["i32"], |args| {
        Outcome::value(format!("pong{}", args[0]))
    });

    let skeleton = Skeleton::new(descriptor.clone(), dispatcher)?;
    skeleton.start()?;
    println!("skeleton listening on {:?}", skeleton.address());

    let stub = Stub::create(descriptor, &skeleton)?;
    for round in 0..4 {
        let reply: String = stub.call("ping", (round,))?;
        println!("round {}: {}", round, reply);
    }

    skeleton.stop();
    Ok(())
}
