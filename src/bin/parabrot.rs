extern crate clap;
extern crate env_logger;
extern crate num_cpus;
extern crate parabrot;

use clap::{App, Arg, ArgMatches};
use parabrot::encode::{output_path, write_image};
use parabrot::{EscapeTest, ImageFormat, NaiveRenderer, Pipeline, PlaneBounds, Raster, RunConfig};
use std::path::Path;
use std::str::FromStr;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_bounds(s: &str) -> Option<PlaneBounds> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| f64::from_str(v.trim()))
        .collect::<Result<_, _>>()
        .ok()?;
    match values.as_slice() {
        [re_start, re_end, im_start, im_end] => Some(PlaneBounds {
            re_start: *re_start,
            re_end: *re_end,
            im_start: *im_start,
            im_end: *im_end,
        }),
        _ => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const SIZE: &str = "size";
const SCALE: &str = "scale";
const REGIONS: &str = "regions";
const WORKERS: &str = "workers";
const ITERATIONS: &str = "iterations";
const PLANE: &str = "plane";
const RADIUS: &str = "radius";
const FORMAT: &str = "format";
const OUT_DIR: &str = "out-dir";
const LEGACY_ESCAPE: &str = "legacy-escape";
const SEQUENTIAL: &str = "sequential";
const QUIET: &str = "quiet";

fn args<'a>() -> ArgMatches<'a> {
    App::new("parabrot")
        .version("0.1.0")
        .about("Region-parallel Mandelbrot renderer")
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("600x400")
                .validator(|s| validate_pair::<usize>(&s, 'x', "Could not parse output image size"))
                .help("Base size of the output image, before scaling"),
        )
        .arg(
            Arg::with_name(SCALE)
                .long(SCALE)
                .short("k")
                .takes_value(true)
                .default_value("10")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        100,
                        "Could not parse scale",
                        "Scale must be between 1 and 100",
                    )
                })
                .help("Multiplier applied to both sides of the image"),
        )
        .arg(
            Arg::with_name(REGIONS)
                .long(REGIONS)
                .short("r")
                .takes_value(true)
                .default_value("64")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1_000_000,
                        "Could not parse region count",
                        "Region count must be between 1 and 1000000",
                    )
                })
                .help("Number of regions to split the image into; rounded down to a square"),
        )
        .arg(
            Arg::with_name(WORKERS)
                .long(WORKERS)
                .short("w")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1024,
                        "Could not parse worker count",
                        "Worker count must be between 1 and 1024",
                    )
                })
                .help("Most regions rendered at the same time [default: number of CPUs]"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("255")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Iterations before a point is counted as inside the set"),
        )
        .arg(
            Arg::with_name(PLANE)
                .long(PLANE)
                .short("p")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2,1,-1,1")
                .validator(|s| match parse_bounds(&s) {
                    Some(_) => Ok(()),
                    None => Err("Plane must be four numbers: re_start,re_end,im_start,im_end"
                        .to_string()),
                })
                .help("Window onto the complex plane, as re_start,re_end,im_start,im_end"),
        )
        .arg(
            Arg::with_name(RADIUS)
                .long(RADIUS)
                .takes_value(true)
                .default_value("2")
                .validator(|s| match f64::from_str(&s) {
                    Ok(_) => Ok(()),
                    Err(_) => Err("Could not parse escape radius".to_string()),
                })
                .help("Magnitude past which a point has escaped"),
        )
        .arg(
            Arg::with_name(FORMAT)
                .long(FORMAT)
                .short("f")
                .takes_value(true)
                .possible_values(&["png", "pnm", "pgm"])
                .default_value("png")
                .help("Output image format"),
        )
        .arg(
            Arg::with_name(OUT_DIR)
                .long(OUT_DIR)
                .short("o")
                .takes_value(true)
                .default_value(".")
                .help("Directory the image is written to"),
        )
        .arg(
            Arg::with_name(LEGACY_ESCAPE)
                .long(LEGACY_ESCAPE)
                .help("Single precision, real-part-only escape test, as older renders used"),
        )
        .arg(
            Arg::with_name(SEQUENTIAL)
                .long(SEQUENTIAL)
                .help("Render on one thread, without the pipeline"),
        )
        .arg(
            Arg::with_name(QUIET)
                .long(QUIET)
                .short("q")
                .help("Do not draw progress bars"),
        )
        .get_matches()
}

// Every value below has passed its validator, so parsing cannot fail.
fn config(matches: &ArgMatches) -> RunConfig {
    let (width, height): (usize, usize) =
        parse_pair(matches.value_of(SIZE).unwrap(), 'x').expect("Error parsing image dimensions");
    let scale = usize::from_str(matches.value_of(SCALE).unwrap()).expect("Error parsing scale");
    RunConfig {
        width: width * scale,
        height: height * scale,
        region_count: usize::from_str(matches.value_of(REGIONS).unwrap())
            .expect("Error parsing region count"),
        worker_count: matches
            .value_of(WORKERS)
            .map(|w| usize::from_str(w).expect("Error parsing worker count"))
            .unwrap_or_else(num_cpus::get),
        iteration_bound: usize::from_str(matches.value_of(ITERATIONS).unwrap())
            .expect("Error parsing iteration count"),
        plane: parse_bounds(matches.value_of(PLANE).unwrap()).expect("Error parsing plane"),
        escape_radius: f64::from_str(matches.value_of(RADIUS).unwrap())
            .expect("Error parsing escape radius"),
        escape_test: if matches.is_present(LEGACY_ESCAPE) {
            EscapeTest::LegacyRealPart
        } else {
            EscapeTest::Modulus
        },
        progress: !matches.is_present(QUIET),
    }
}

fn render(config: &RunConfig, sequential: bool) -> parabrot::Result<(Raster, usize)> {
    if sequential {
        let raster = NaiveRenderer::new(config)?.render()?;
        let pixels = raster.filled();
        Ok((raster, pixels))
    } else {
        let rendered = Pipeline::new(config).run()?;
        Ok((rendered.raster, rendered.pixels))
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = args();
    let config = config(&matches);
    let format = ImageFormat::from_str(matches.value_of(FORMAT).unwrap())
        .expect("Error parsing image format");

    let (raster, pixels) = match render(&config, matches.is_present(SEQUENTIAL)) {
        Err(e) => {
            eprintln!("Render failure: {}", e);
            std::process::exit(1);
        }
        Ok(done) => done,
    };
    println!("Pixels rendered: {}", pixels);

    let path = output_path(Path::new(matches.value_of(OUT_DIR).unwrap()), &config, format);
    match write_image(&path, &raster, format) {
        Err(e) => eprintln!("err: {}", e),
        Ok(()) => println!("Image created: {}", path.display()),
    }
}
