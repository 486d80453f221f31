//! To describe dump of a built vocabulary


/// only Bson now.
#[derive(Copy, Clone)]
pub enum Format {
    BSON,
}

pub struct Output {
    /// describe output format
    fmt : Format,
    /// name of output file
    output_name : String,
}

impl Output {
    /// if output_name is None, default output_name will be "vocabulary.bson"
    pub fn new(fmt : Format, output_name : &Option<String>) -> Self {
        let output_name = match output_name  {
            Some(name) => {
                    let mut bson_name = name.clone();
                    bson_name.push_str(".bson");
                    bson_name
            },
            None => String::from("vocabulary.bson"),
        };
        Output{fmt, output_name : output_name}
    }
    /// get ouput format
    pub fn get_fmt(&self) -> Format { self.fmt}

    /// get output_name
    pub fn get_output_name(&self) -> &String { &self.output_name}

}  // end of Output


impl Default for Output {
    fn default() -> Self {
        Output{fmt : Format::BSON, output_name : String::from("vocabulary.bson")}
    }
}
