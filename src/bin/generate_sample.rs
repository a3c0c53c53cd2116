use std::collections::BTreeMap;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn next_range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64() % (hi - lo)
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const HEADER: [&str; 18] = [
    "Event",
    "Time",
    "S_Node",
    "Node_id",
    "Rest_Energy",
    "Trace_Level",
    "Mac_Type_Pckt",
    "Source_IP_Port",
    "Des_IP_Port",
    "Packet_Size",
    "TTL",
    "Hop_Count",
    "Broadcast_ID",
    "Dest_Node_Num",
    "Dest_Seq_Num",
    "Src_Node_ID",
    "Src_Seq_Num",
    "Class",
];

fn main() {
    let mut rng = SimpleRng::new(42);

    let n_nodes: u64 = 40;
    let n_events: u64 = 5000;
    let sim_end = 10.0;

    // A handful of compromised nodes; everything they emit is an attack.
    let blackhole_nodes = [7u64, 19, 31];
    let forwarding_nodes = [12u64, 26];

    // Per-node remaining energy, drained as the node reports.
    let mut energy: BTreeMap<u64, f64> = (1..=n_nodes).map(|id| (id, 600.0)).collect();
    let mut seq: BTreeMap<u64, u64> = BTreeMap::new();

    let output_path = "demo_wsn.csv";
    let file = std::fs::File::create(output_path).expect("Failed to create output file");
    let mut wtr = csv::Writer::from_writer(file);
    wtr.write_record(HEADER).expect("Failed to write header");

    let mut time = 0.0;
    for event in 1..=n_events {
        time += sim_end / n_events as f64 * (0.5 + rng.next_f64());
        let node = rng.next_range(1, n_nodes + 1);

        let class = if blackhole_nodes.contains(&node) {
            "Blackhole"
        } else if forwarding_nodes.contains(&node) {
            "Forwarding"
        } else {
            "normal"
        };

        // Attack traffic burns energy faster.
        let drain = match class {
            "normal" => rng.gauss(0.03, 0.01).abs(),
            _ => rng.gauss(0.12, 0.03).abs(),
        };
        let e = energy.entry(node).or_insert(600.0);
        *e = (*e - drain).max(0.0);

        let dest = rng.next_range(1, n_nodes + 1);
        let packet_size = rng.next_range(64, 1024);
        let ttl = rng.next_range(10, 64);
        let hops = rng.next_range(1, 6);
        let node_seq = seq.entry(node).or_insert(0);
        *node_seq += 1;

        wtr.write_record([
            event.to_string(),
            format!("{time:.4}"),
            node.to_string(),
            node.to_string(),
            format!("{:.4}", *e),
            "5".to_string(),
            "AODV".to_string(),
            format!("1.0.{node}.21"),
            format!("1.0.{dest}.21"),
            packet_size.to_string(),
            ttl.to_string(),
            hops.to_string(),
            (event % 100).to_string(),
            dest.to_string(),
            rng.next_range(1, 100).to_string(),
            node.to_string(),
            node_seq.to_string(),
            class.to_string(),
        ])
        .expect("Failed to write row");
    }

    wtr.flush().expect("Failed to flush output");
    println!("Wrote {n_events} events across {n_nodes} nodes to {output_path}");
}
