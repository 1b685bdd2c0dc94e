use potts::graph::{Graph, GraphKind};
use potts::sampler::sample_seeded;
use potts::state::Parameters;

fn main() {
    let mut n: Option<usize> = None;
    let mut q: Option<usize> = None;
    let mut delta: Option<usize> = None;
    let mut b: f64 = 0.95;
    let mut kind = GraphKind::Cycle;
    let mut seed: Option<u64> = None;

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--number" | "-n" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                n = Some(v.parse().unwrap_or_else(|_| usage_and_exit(2)));
                i += 2;
            }
            "--colours" | "-q" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                q = Some(v.parse().unwrap_or_else(|_| usage_and_exit(2)));
                i += 2;
            }
            "--delta" | "-d" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                delta = Some(v.parse().unwrap_or_else(|_| usage_and_exit(2)));
                i += 2;
            }
            "--parameter" | "-B" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                b = v.parse().unwrap_or_else(|_| usage_and_exit(2));
                i += 2;
            }
            "--type" | "-t" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                kind = v.parse().unwrap_or_else(|_| usage_and_exit(2));
                i += 2;
            }
            "--seed" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                seed = Some(v.parse().unwrap_or_else(|_| usage_and_exit(2)));
                i += 2;
            }
            "--help" | "-h" => usage_and_exit(0),
            _ => usage_and_exit(2),
        }
    }

    let (Some(n), Some(q), Some(delta)) = (n, q, delta) else {
        usage_and_exit(2);
    };
    let params = Parameters { n, q, delta, b };

    // The algorithm still runs outside these ranges, but the convergence
    // guarantee does not hold there; report every violation at once.
    let violations = params.violations();
    if !violations.is_empty() {
        for violation in &violations {
            eprintln!("{violation}");
        }
        std::process::exit(1);
    }

    let graph = Graph::build(n, kind);
    let seed = seed.unwrap_or_else(rand::random::<u64>);

    match sample_seeded(&params, &graph, seed) {
        Ok(colouring) => {
            print!("{graph}");
            println!("n = {n}, q = {q}, delta = {delta}, B = {b}, seed = {seed}");
            let rendered: Vec<String> = colouring.iter().map(ToString::to_string).collect();
            println!("{}", rendered.join(","));
        }
        Err(e) => {
            eprintln!("Sampling failed: {e}");
            std::process::exit(1);
        }
    }
}

fn usage_and_exit(code: i32) -> ! {
    eprintln!(
        "Usage:\n  potts -n N -q Q -d DELTA [-B B] [-t TYPE] [--seed SEED]\n\nOptions:\n  --number/-n N       Number of vertices (required)\n  --colours/-q Q      Number of colours (required; must satisfy q > 2 * delta)\n  --delta/-d DELTA    Maximum degree bound of the graph (required; at least 3)\n  --parameter/-B B    Interaction strength in (1 - (q - 2*delta)/delta, 1) (default: 0.95)\n  --type/-t TYPE      Graph topology: cycle or complete (default: cycle)\n  --seed SEED         Deterministic seed (default: drawn from the OS)\n"
    );
    std::process::exit(code)
}
