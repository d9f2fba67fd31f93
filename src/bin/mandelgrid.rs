// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate failure;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate mandelgrid;
extern crate num;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use itertools::Itertools;
use mandelgrid::{GridImageBuilder, PlaneMapper, ResultGrid, Strategy};
use num::Complex;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::str::FromStr;
use std::time::Instant;

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

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
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

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const THREADS: &str = "threads";
const ITERATIONS: &str = "iterations";
const EVALUATOR: &str = "evaluator";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("mandelgrid")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Escape-time Mandelbrot grid evaluator")
        .arg(
            Arg::with_name(OUTPUT)
                .required(false)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file; the grid goes to standard output if absent"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("250x250")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse grid size"))
                .help("Number of samples along the real and imaginary axes"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .required(false)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2.0,-1.25")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
                .help("Left lower corner of the sampled region"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .required(false)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0.5,1.25")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
                .help("Right upper corner of the sampled region"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads to use in solver (default: one per CPU)"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("500")
                .validator(|s| {
                    usize::from_str(&s)
                        .map(|_| ())
                        .map_err(|_| "Could not parse iteration count".to_string())
                })
                .help("Maximum number of iterations per sample"),
        )
        .arg(
            Arg::with_name(EVALUATOR)
                .required(false)
                .long(EVALUATOR)
                .short("e")
                .takes_value(true)
                .possible_values(&["reference", "naive", "optimized"])
                .default_value("optimized")
                .help("Which escape-time evaluator to use"),
        )
        .get_matches()
}

fn write_grid<W: Write>(output: W, grid: &ResultGrid) -> Result<(), io::Error> {
    let mut output = BufWriter::new(output);
    for row in grid.rows() {
        writeln!(output, "{}", row.iter().join(","))?;
    }
    output.flush()
}

fn run(matches: &ArgMatches) -> Result<(), failure::Error> {
    let size: (u16, u16) = matches
        .value_of(SIZE)
        .and_then(|s| parse_pair(s, 'x'))
        .ok_or_else(|| format_err!("Error parsing grid size"))?;
    let size = (usize::from(size.0), usize::from(size.1));
    let leftlower = matches
        .value_of(LEFTLOWER)
        .and_then(parse_complex)
        .ok_or_else(|| format_err!("Error parsing left lower point"))?;
    let rightupper = matches
        .value_of(RIGHTUPPER)
        .and_then(parse_complex)
        .ok_or_else(|| format_err!("Error parsing right upper point"))?;
    let threads = match matches.value_of(THREADS) {
        Some(t) => usize::from_str(t)?,
        None => num_cpus::get(),
    };
    let iterations = usize::from_str(matches.value_of(ITERATIONS).unwrap_or("500"))?;
    let strategy = Strategy::from_str(matches.value_of(EVALUATOR).unwrap_or("optimized"))
        .map_err(failure::err_msg)?;

    let plane = PlaneMapper::new(size.0, size.1, leftlower, rightupper)?;
    let (xs, ys) = plane.axes();

    let started = Instant::now();
    let grid = GridImageBuilder::new(strategy.evaluator())
        .threads(threads)
        .build(&xs, &ys, iterations)?;
    let elapsed = started.elapsed();
    info!(
        "Evaluated {}x{} samples with the {} evaluator in {}.{:03}s",
        size.0,
        size.1,
        strategy,
        elapsed.as_secs(),
        elapsed.subsec_millis()
    );

    match matches.value_of(OUTPUT) {
        Some(path) => {
            write_grid(File::create(path)?, &grid)?;
            info!("Wrote grid to {}", path);
        }
        None => {
            let stdout = io::stdout();
            write_grid(stdout.lock(), &grid)?;
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
