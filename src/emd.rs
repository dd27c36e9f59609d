use crate::util::hamming_distance;

const MASS_SCALE: f64 = 1_000_000.0;

struct FlowEdge {
    to: usize,
    rev: usize,
    cap: i64,
    cost: i64,
}

fn add_edge(network: &mut [Vec<FlowEdge>], from: usize, to: usize, cap: i64, cost: i64) {
    let rev_from = network[to].len();
    let rev_to = network[from].len();
    network[from].push(FlowEdge {
        to,
        rev: rev_from,
        cap,
        cost,
    });
    network[to].push(FlowEdge {
        to: from,
        rev: rev_to,
        cap: 0,
        cost: -cost,
    });
}

/// Minimum transport cost between two discrete mass vectors, solved by
/// successive shortest paths with Johnson potentials. Masses are scaled to
/// integers; the rounding remainder is absorbed into the last demand bin.
fn min_cost_flow(cost: &[Vec<usize>], supply: &[f64], demand: &[f64]) -> f64 {
    let m = supply.len();
    let n = demand.len();
    let num_vertices = m + n + 2;
    let source = 0;
    let sink = num_vertices - 1;

    let supply_int: Vec<i64> = supply.iter().map(|x| (x * MASS_SCALE).round() as i64).collect();
    let mut demand_int: Vec<i64> = demand.iter().map(|x| (x * MASS_SCALE).round() as i64).collect();

    let total: i64 = supply_int.iter().sum();
    let total_demand: i64 = demand_int.iter().sum();
    if let Some(last) = demand_int.last_mut() {
        *last += total - total_demand;
    }

    let mut network: Vec<Vec<FlowEdge>> = (0..num_vertices).map(|_| Vec::new()).collect();

    for (i, cap) in supply_int.iter().enumerate() {
        add_edge(&mut network, source, 1 + i, *cap, 0);
    }
    for (j, cap) in demand_int.iter().enumerate() {
        add_edge(&mut network, 1 + m + j, sink, *cap, 0);
    }
    for i in 0..m {
        for j in 0..n {
            add_edge(&mut network, 1 + i, 1 + m + j, i64::MAX / 4, cost[i][j] as i64);
        }
    }

    let mut potentials = vec![0i64; num_vertices];
    let mut flow = 0i64;
    let mut total_cost = 0i64;

    while flow < total {
        let (dist, prev_vertex, prev_edge) = shortest_paths(&network, source, &potentials);

        if dist[sink] == i64::MAX {
            break;
        }

        for v in 0..num_vertices {
            if dist[v] < i64::MAX {
                potentials[v] += dist[v];
            }
        }

        let mut bottleneck = total - flow;
        let mut v = sink;
        while v != source {
            let u = prev_vertex[v];
            bottleneck = bottleneck.min(network[u][prev_edge[v]].cap);
            v = u;
        }

        let mut v = sink;
        while v != source {
            let u = prev_vertex[v];
            let edge_idx = prev_edge[v];
            let rev = network[u][edge_idx].rev;
            network[u][edge_idx].cap -= bottleneck;
            total_cost += bottleneck * network[u][edge_idx].cost;
            network[v][rev].cap += bottleneck;
            v = u;
        }

        flow += bottleneck;
    }

    total_cost as f64 / MASS_SCALE
}

fn shortest_paths(
    network: &[Vec<FlowEdge>],
    source: usize,
    potentials: &[i64],
) -> (Vec<i64>, Vec<usize>, Vec<usize>) {
    let num_vertices = network.len();
    let mut dist = vec![i64::MAX; num_vertices];
    let mut prev_vertex = vec![usize::MAX; num_vertices];
    let mut prev_edge = vec![usize::MAX; num_vertices];
    let mut visited = vec![false; num_vertices];
    dist[source] = 0;

    for _ in 0..num_vertices {
        let mut current = usize::MAX;
        for v in 0..num_vertices {
            if !visited[v] && dist[v] < i64::MAX && (current == usize::MAX || dist[v] < dist[current])
            {
                current = v;
            }
        }
        if current == usize::MAX {
            break;
        }
        visited[current] = true;

        for (edge_idx, edge) in network[current].iter().enumerate() {
            if edge.cap <= 0 {
                continue;
            }
            let reduced = dist[current] + edge.cost + potentials[current] - potentials[edge.to];
            if reduced < dist[edge.to] {
                dist[edge.to] = reduced;
                prev_vertex[edge.to] = current;
                prev_edge[edge.to] = edge_idx;
            }
        }
    }

    (dist, prev_vertex, prev_edge)
}

fn normalize(dist: &[f64]) -> Vec<f64> {
    let sum: f64 = dist.iter().sum();
    if sum <= 0.0 {
        return vec![0.0; dist.len()];
    }
    dist.iter().map(|x| x / sum).collect()
}

/// Earth mover's distance between two distributions over bitmask states,
/// with Hamming distance as the ground metric. Inputs are normalized and
/// zero-padded to a common length.
pub fn emd_hamming(p: &[f64], q: &[f64]) -> f64 {
    let num_states = p.len().max(q.len());

    let mut padded_p = p.to_vec();
    padded_p.resize(num_states, 0.0);
    let mut padded_q = q.to_vec();
    padded_q.resize(num_states, 0.0);

    let supply = normalize(&padded_p);
    let demand = normalize(&padded_q);

    let cost: Vec<Vec<usize>> = (0..num_states)
        .map(|i| (0..num_states).map(|j| hamming_distance(i, j)).collect())
        .collect();

    min_cost_flow(&cost, &supply, &demand)
}
