use glam::Vec3;

/// Some volume defined by a minimum and maximum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct MinMax<T> {
	pub min: T,
	pub max: T,
}

impl<T> MinMax<T> where T: Clone {
	pub fn new(a: T) -> Self {
		Self { min: a.clone(), max: a }
	}
}

pub trait VecMinMax {
	fn update(&mut self, v: Vec3);
	fn contains(&self, v: Vec3) -> bool;
	fn intersects(&self, other: &Self) -> bool;
}

impl VecMinMax for MinMax<Vec3> {
	fn update(&mut self, v: Vec3) {
		self.min = self.min.min(v);
		self.max = self.max.max(v);
	}

	fn contains(&self, v: Vec3) -> bool {
		self.min.cmple(v).all() && self.max.cmpge(v).all()
	}

	fn intersects(&self, other: &Self) -> bool {
		self.min.cmplt(other.max).all() && self.max.cmpgt(other.min).all()
	}
}

pub trait VecMinMaxFromIterator: Iterator {
	fn min_max(self) -> Option<MinMax<Vec3>>;
}

impl<T> VecMinMaxFromIterator for T where T: Iterator<Item = Vec3> {
	fn min_max(mut self) -> Option<MinMax<Vec3>> {
		let mut min_max = MinMax::new(self.next()?);
		for v in self {
			min_max.update(v);
		}
		Some(min_max)
	}
}

pub trait ScalarMinMax<T> {
	fn update(&mut self, a: T);
	fn contains(&self, a: T) -> bool;
}

impl<T> ScalarMinMax<T> for MinMax<T> where T: Copy + Ord {
	fn update(&mut self, a: T) {
		self.min = self.min.min(a);
		self.max = self.max.max(a);
	}

	/// Half-open: `min <= a < max`.
	fn contains(&self, a: T) -> bool {
		self.min <= a && a < self.max
	}
}
