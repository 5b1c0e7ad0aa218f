/// Deterministic seat arrangements cycled across games. Entry `seat` of an
/// arrangement is the agent index sitting there.
pub struct SeatRotation {
    arrangements: Vec<Vec<usize>>,
}

impl SeatRotation {
    /// With fewer agents than seats, agents fill the table round-robin
    /// before arrangements are generated.
    pub fn new(num_agents: usize, num_seats: usize) -> Self {
        let mut base: Vec<usize> = (0..num_seats).map(|seat| seat % num_agents.max(1)).collect();
        let mut arrangements = Vec::new();
        generate(&mut base, 0, &mut arrangements);
        Self { arrangements }
    }

    pub fn len(&self) -> usize {
        self.arrangements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrangements.is_empty()
    }

    pub fn as_slice(&self) -> &[Vec<usize>] {
        &self.arrangements
    }

    /// Arrangement used for the given game.
    pub fn seating(&self, game_index: usize) -> &[usize] {
        if self.arrangements.is_empty() {
            return &[];
        }
        &self.arrangements[game_index % self.arrangements.len()]
    }
}

fn generate(data: &mut Vec<usize>, start: usize, output: &mut Vec<Vec<usize>>) {
    if start + 1 >= data.len() {
        if !output.contains(data) {
            output.push(data.clone());
        }
        return;
    }

    for idx in start..data.len() {
        data.swap(start, idx);
        generate(data, start + 1, output);
        data.swap(start, idx);
    }
}
