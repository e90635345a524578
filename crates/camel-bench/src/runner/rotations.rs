/// Deterministic seat orders: rotation `r` seats player `(seat + r) % n` in `seat`.
pub struct SeatRotations {
    rotations: Vec<Vec<usize>>,
}

impl SeatRotations {
    pub fn new(players: usize, count: usize) -> Self {
        let limit = count.min(players);
        let rotations = (0..limit)
            .map(|shift| (0..players).map(|seat| (seat + shift) % players).collect())
            .collect();
        Self { rotations }
    }

    pub fn as_slice(&self) -> &[Vec<usize>] {
        &self.rotations
    }

    pub fn len(&self) -> usize {
        self.rotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rotations.is_empty()
    }
}
