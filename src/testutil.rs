//! In-memory DogMove fixtures for unit tests

use crate::loader::Dataset;

pub const HEADER: &str = "DogID,TestNum,t_sec,ABack_x,ABack_y,ABack_z,ANeck_x,ANeck_y,ANeck_z,GBack_x,GBack_y,GBack_z,GNeck_x,GNeck_y,GNeck_z,Task,Behavior_1,Behavior_2,Behavior_3,PointEvent";

/// Builder for one data row
#[derive(Debug, Clone)]
pub struct SampleRow {
    dog_id: u32,
    test_num: u32,
    t_sec: f64,
    back_accel: [f64; 3],
    neck_accel: [f64; 3],
    back_gyro: [f64; 3],
    neck_gyro: [f64; 3],
    labels: [String; 3],
}

impl SampleRow {
    pub fn new(dog_id: u32, test_num: u32, t_sec: f64) -> Self {
        Self {
            dog_id,
            test_num,
            t_sec,
            back_accel: [0.0; 3],
            neck_accel: [0.0; 3],
            back_gyro: [0.0; 3],
            neck_gyro: [0.0; 3],
            labels: [
                "Walking".to_string(),
                "<undefined>".to_string(),
                "<undefined>".to_string(),
            ],
        }
    }

    pub fn labels(mut self, labels: [&str; 3]) -> Self {
        self.labels = labels.map(str::to_string);
        self
    }

    pub fn neck_accel(mut self, x: f64, y: f64, z: f64) -> Self {
        self.neck_accel = [x, y, z];
        self
    }

    pub fn neck_gyro(mut self, x: f64, y: f64, z: f64) -> Self {
        self.neck_gyro = [x, y, z];
        self
    }

    pub fn back_accel(mut self, x: f64, y: f64, z: f64) -> Self {
        self.back_accel = [x, y, z];
        self
    }

    fn to_line(&self) -> String {
        let axes = |a: &[f64; 3]| format!("{},{},{}", a[0], a[1], a[2]);
        format!(
            "{},{},{},{},{},{},{},Task,{},{},{},<undefined>",
            self.dog_id,
            self.test_num,
            self.t_sec,
            axes(&self.back_accel),
            axes(&self.neck_accel),
            axes(&self.back_gyro),
            axes(&self.neck_gyro),
            self.labels[0],
            self.labels[1],
            self.labels[2],
        )
    }
}

/// Render rows as a comma-delimited file with header
pub fn csv_text(rows: &[SampleRow]) -> String {
    let mut text = String::from(HEADER);
    text.push('\n');
    for row in rows {
        text.push_str(&row.to_line());
        text.push('\n');
    }
    text
}

/// Parse rows into a prepared dataset
pub fn dataset(rows: &[SampleRow]) -> Dataset {
    let text = csv_text(rows);
    Dataset::from_reader(text.as_bytes()).expect("fixture rows are valid")
}
